//! Pieces shared by the `jobmatch` CLI and the HTTP server: configuration,
//! tracing setup and construction of the long-lived services.

pub mod config;
#[cfg(feature = "cli")]
pub mod config_override;
pub mod error;
pub mod logging;
pub mod services;

pub use config::JobmatchConfig;
#[cfg(feature = "cli")]
pub use config_override::{ConfigOverrides, ProviderArg};
pub use error::{ConfigError, Result};
pub use logging::init_tracing;
pub use services::Services;
