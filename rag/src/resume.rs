//! Résumé text extraction.

use std::path::Path;

use tracing::debug;

use crate::error::ResumeError;

/// Extract the text of a PDF résumé.
///
/// Parsing runs on the blocking pool; a parser panic on a malformed file is
/// reported as [`ResumeError::UnreadablePdf`].
pub async fn load_resume_bytes(bytes: Vec<u8>) -> Result<String, ResumeError> {
    if bytes.is_empty() {
        return Err(ResumeError::UnreadablePdf("empty upload".to_string()));
    }
    if !bytes.starts_with(b"%PDF") {
        return Err(ResumeError::UnreadablePdf("missing %PDF header".to_string()));
    }

    let size = bytes.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|err| ResumeError::UnreadablePdf(err.to_string()))?
        .map_err(|err| ResumeError::UnreadablePdf(err.to_string()))?;

    if text.trim().is_empty() {
        return Err(ResumeError::NoText);
    }
    debug!("Extracted {} chars from {size} byte resume", text.len());
    Ok(text)
}

/// Read and extract a PDF résumé from disk.
pub async fn load_resume_file(path: &Path) -> Result<String, ResumeError> {
    let bytes = tokio::fs::read(path).await?;
    load_resume_bytes(bytes).await
}
