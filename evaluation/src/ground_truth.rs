//! Synthetic ground truth: a generated résumé per known posting.

use std::path::Path;
use std::sync::Arc;

use jobmatch_rag::{CompletionClient, CompletionRequest};
use jobmatch_search::JobPosting;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Model that writes the synthetic résumés.
pub const DEFAULT_GROUND_TRUTH_MODEL: &str = "gpt-4.1-nano";

/// Output cap for one synthetic résumé.
pub const DEFAULT_GROUND_TRUTH_MAX_TOKENS: u32 = 1000;

/// One CSV row: the posting a résumé was written for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthRecord {
    pub job_id: String,
    pub generated_resume: String,
    pub job_description: String,
}

/// Read `job_id,generated_resume,job_description` rows.
pub fn read_ground_truth(path: &Path) -> Result<Vec<GroundTruthRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<GroundTruthRecord>, csv::Error>>()?;
    info!("Loaded {} ground-truth records from {}", records.len(), path.display());
    Ok(records)
}

/// Write records with a header row, replacing `path`.
pub fn write_ground_truth(path: &Path, records: &[GroundTruthRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!("Wrote {} ground-truth records to {}", records.len(), path.display());
    Ok(())
}

fn resume_prompt(job_description: &str) -> String {
    format!(
        "Based on the following job description, generate an one-page resume that would be a strong match for the role.\n\
         If you can, don't just copy exactly the job description.\n\
         Instead, create a resume that highlights relevant skills and experiences.\n\
         \n\
         Job Description:\n\
         {job_description}"
    )
}

/// Result of a generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRun {
    pub records: Vec<GroundTruthRecord>,
    /// Postings whose completion failed.
    pub failed: usize,
}

/// Asks a completion model for one matching résumé per posting.
pub struct GroundTruthGenerator {
    completion: Arc<dyn CompletionClient>,
    model: String,
    max_tokens: u32,
}

impl GroundTruthGenerator {
    pub fn new(completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            completion,
            model: DEFAULT_GROUND_TRUTH_MODEL.to_string(),
            max_tokens: DEFAULT_GROUND_TRUTH_MAX_TOKENS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Generate for the first `sample_size` postings, sequentially.
    pub async fn generate(&self, postings: &[JobPosting], sample_size: usize) -> GenerationRun {
        let mut run = GenerationRun::default();
        for posting in postings.iter().take(sample_size) {
            let request = CompletionRequest::new(resume_prompt(&posting.clean_description))
                .with_model(&self.model)
                .with_max_tokens(self.max_tokens);
            match self.completion.complete(&request).await {
                Ok(resume) => {
                    info!("Generated resume for job ID {}", posting.id);
                    run.records.push(GroundTruthRecord {
                        job_id: posting.id.clone(),
                        generated_resume: resume,
                        job_description: posting.clean_description.clone(),
                    });
                }
                Err(err) => {
                    warn!("Resume generation failed for job ID {}: {err}", posting.id);
                    run.failed += 1;
                }
            }
        }
        run
    }
}
