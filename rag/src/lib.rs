//! # Resume Matching RAG
//!
//! Turns a résumé into a recommendation: the résumé text drives a hybrid
//! search over the job index, the top postings are folded into a prompt, and
//! a chat-completion model writes the answer.
//!
//! - [`load_resume_bytes`] / [`load_resume_file`]: PDF to plain text
//! - [`compose_prompt`]: fixed template with a [`PromptMode`] instruction
//! - [`CompletionClient`]: chat completions with bounded retry
//! - [`RagPipeline`]: search, compose, complete

pub mod completion;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod resume;

pub use completion::{
    CompletionClient, CompletionRequest, DEFAULT_COMPLETION_MODEL, OpenAiCompletionClient,
};
pub use config::{CompletionConfig, RagConfig};
pub use error::{CompletionError, RagError, Result, ResumeError};
pub use pipeline::{RagAnswer, RagPipeline};
pub use prompt::{PromptMode, compose_prompt};
pub use resume::{load_resume_bytes, load_resume_file};
