use std::path::Path;

use anyhow::Context;
use jobmatch_common::{JobmatchConfig, Services};
use jobmatch_evaluation::{
    EngineSearch, GroundTruthGenerator, RagEvaluator, RetrievalEvaluator, read_ground_truth,
    write_ground_truth,
};
use jobmatch_rag::{PromptMode, load_resume_file};
use jobmatch_search::{JobPosting, load_source_documents};
use tracing::{info, warn};

pub async fn ingest(
    config: JobmatchConfig,
    api_key: Option<&str>,
    source: &Path,
    keep_index: bool,
) -> anyhow::Result<()> {
    let services = Services::build(config, api_key)?;
    let index = services.config.store.index.clone();
    let manager = services.index_manager();

    let records = load_source_documents(source)
        .await
        .with_context(|| format!("failed to read {}", source.display()))?;
    if !keep_index {
        manager
            .create_index(&index, &services.config.index_schema())
            .await
            .with_context(|| format!("failed to create index {index}"))?;
    }

    let report = manager.ingest(&index, records).await?;
    for failure in &report.failures {
        warn!(
            "Skipped record {} ({}): {}",
            failure.position,
            failure.id.as_deref().unwrap_or("no id"),
            failure.reason
        );
    }
    let total = manager.count(&index).await?;
    println!(
        "Indexed {} postings into {index} ({} skipped, {total} in index)",
        report.succeeded, report.failed
    );
    Ok(())
}

pub async fn generate_ground_truth(
    config: JobmatchConfig,
    api_key: Option<&str>,
    source: &Path,
    output: &Path,
    samples: usize,
    model: &str,
) -> anyhow::Result<()> {
    let services = Services::build(config, api_key)?;
    let completion = services.require_completion()?;

    let records = load_source_documents(source)
        .await
        .with_context(|| format!("failed to read {}", source.display()))?;
    let mut postings = Vec::with_capacity(samples.min(records.len()));
    for (position, record) in records.into_iter().enumerate() {
        if postings.len() == samples {
            break;
        }
        match JobPosting::from_value(record) {
            Ok(posting) => postings.push(posting),
            Err(err) => warn!("Skipping source record {position}: {err}"),
        }
    }

    let run = GroundTruthGenerator::new(completion)
        .with_model(model)
        .generate(&postings, samples)
        .await;
    write_ground_truth(output, &run.records)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "Wrote {} ground-truth records to {} ({} failed)",
        run.records.len(),
        output.display(),
        run.failed
    );
    Ok(())
}

pub async fn evaluate_retrieval(
    config: JobmatchConfig,
    api_key: Option<&str>,
    ground_truth: &Path,
    top_k: usize,
    report_json: Option<&Path>,
) -> anyhow::Result<()> {
    let services = Services::build(config, api_key)?;
    let records = read_ground_truth(ground_truth)
        .with_context(|| format!("failed to read {}", ground_truth.display()))?;

    let dense = EngineSearch::dense(services.engine.clone());
    let hybrid = EngineSearch::hybrid(services.engine.clone());
    let report = RetrievalEvaluator::new(top_k)
        .compare(&[&dense, &hybrid], &records)
        .await?;

    println!("{}", report.render());
    if let Some(path) = report_json {
        report.write_json(path)?;
    }
    Ok(())
}

pub async fn evaluate_rag(
    config: JobmatchConfig,
    api_key: Option<&str>,
    ground_truth: &Path,
    models: &[String],
    limit: Option<usize>,
    report_json: Option<&Path>,
) -> anyhow::Result<()> {
    let services = Services::build(config, api_key)?;
    let pipeline = services.require_pipeline()?;

    let mut records = read_ground_truth(ground_truth)
        .with_context(|| format!("failed to read {}", ground_truth.display()))?;
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    info!(
        "Comparing {} models over {} records",
        models.len(),
        records.len()
    );

    let results = RagEvaluator::new(pipeline, services.embedder.clone())
        .evaluate(&records, models)
        .await?;
    println!("{}", RagEvaluator::render(&results));

    if let Some(path) = report_json {
        let json = serde_json::to_string_pretty(&results)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

pub async fn match_resume(
    config: JobmatchConfig,
    api_key: Option<&str>,
    resume: &Path,
    mode: PromptMode,
) -> anyhow::Result<()> {
    let services = Services::build(config, api_key)?;
    let pipeline = services.require_pipeline()?;

    let text = load_resume_file(resume)
        .await
        .with_context(|| format!("failed to read resume {}", resume.display()))?;
    let answer = pipeline.answer(&text, mode, None).await?;
    for job in &answer.jobs {
        info!("Candidate posting {}: {}", job.id, job.title);
    }
    println!("{}", answer.answer);
    Ok(())
}
