//! `jobmatch`: ingest job postings, match résumés and evaluate retrieval.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use jobmatch_common::{ConfigOverrides, init_tracing};
use jobmatch_evaluation::DEFAULT_RAG_MODELS;
use jobmatch_rag::PromptMode;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "jobmatch")]
#[command(about = "Hybrid job search over resumes, with retrieval evaluation")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recreate the job index and load postings into it
    Ingest {
        /// JSON array of job postings
        #[arg(long, default_value = "data/seek_jobs.json")]
        source: PathBuf,

        /// Append to the existing index instead of recreating it
        #[arg(long)]
        keep_index: bool,
    },

    /// Write a synthetic resume for each of the first postings
    GenerateGroundTruth {
        /// JSON array of job postings
        #[arg(long, default_value = "data/seek_jobs.json")]
        source: PathBuf,

        /// Output CSV
        #[arg(long, default_value = "data/ground-truth-data.csv")]
        output: PathBuf,

        /// Number of postings to sample
        #[arg(long, default_value_t = 100)]
        samples: usize,

        /// Model that writes the resumes
        #[arg(long, default_value = jobmatch_evaluation::DEFAULT_GROUND_TRUTH_MODEL)]
        model: String,
    },

    /// Compare dense and hybrid search with Hit-Rate and MRR
    EvaluateRetrieval {
        #[arg(long, default_value = "data/ground-truth-data.csv")]
        ground_truth: PathBuf,

        /// Hits considered per query
        #[arg(long, default_value_t = 5)]
        top_k: usize,

        /// Also write the full report as JSON
        #[arg(long)]
        report_json: Option<PathBuf>,
    },

    /// Score answers from several chat models against the source descriptions
    EvaluateRag {
        #[arg(long, default_value = "data/ground-truth-data.csv")]
        ground_truth: PathBuf,

        /// Chat models to compare
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_RAG_MODELS.map(String::from))]
        models: Vec<String>,

        /// Only evaluate the first N records
        #[arg(long)]
        limit: Option<usize>,

        /// Also write per-model similarities as JSON
        #[arg(long)]
        report_json: Option<PathBuf>,
    },

    /// Recommend a posting for a PDF resume
    Match {
        /// PDF resume
        resume: PathBuf,

        /// Prompt variant
        #[arg(long, value_enum, default_value_t = ModeArg::Full)]
        mode: ModeArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Best match plus reasoning
    Full,
    /// Only the description of the best match
    JobDescriptionOnly,
}

impl From<ModeArg> for PromptMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Full => Self::Full,
            ModeArg::JobDescriptionOnly => Self::JobDescriptionOnly,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("info");

    let cli = Cli::parse();
    let config = cli.overrides.load()?;
    let api_key = cli.overrides.api_key();

    match cli.command {
        Command::Ingest { source, keep_index } => {
            commands::ingest(config, api_key, &source, keep_index).await
        }
        Command::GenerateGroundTruth {
            source,
            output,
            samples,
            model,
        } => commands::generate_ground_truth(config, api_key, &source, &output, samples, &model).await,
        Command::EvaluateRetrieval {
            ground_truth,
            top_k,
            report_json,
        } => {
            commands::evaluate_retrieval(config, api_key, &ground_truth, top_k, report_json.as_deref())
                .await
        }
        Command::EvaluateRag {
            ground_truth,
            models,
            limit,
            report_json,
        } => {
            commands::evaluate_rag(
                config,
                api_key,
                &ground_truth,
                &models,
                limit,
                report_json.as_deref(),
            )
            .await
        }
        Command::Match { resume, mode } => {
            commands::match_resume(config, api_key, &resume, mode.into()).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_evaluate_rag_defaults_to_three_models() {
        let cli = Cli::parse_from(["jobmatch", "evaluate-rag"]);
        let Command::EvaluateRag { models, limit, .. } = cli.command else {
            panic!("expected evaluate-rag");
        };
        assert_eq!(models, vec!["gpt-4o", "gpt-4.1", "gpt-5"]);
        assert_eq!(limit, None);
    }

    #[test]
    fn test_match_mode_and_global_flags() {
        let cli = Cli::parse_from([
            "jobmatch",
            "match",
            "resume.pdf",
            "--mode",
            "job-description-only",
            "--index",
            "jobs-dev",
        ]);
        assert_eq!(cli.overrides.index.as_deref(), Some("jobs-dev"));
        let Command::Match { resume, mode } = cli.command else {
            panic!("expected match");
        };
        assert_eq!(resume, PathBuf::from("resume.pdf"));
        assert_eq!(PromptMode::from(mode), PromptMode::JobDescriptionOnly);
    }
}
