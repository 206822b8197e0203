/*!
 * Translate job handler.
 *
 * Streams a project's segments through the engine in fixed-size batches,
 * writes drafts back per segment, and records the run's estimated cost for
 * network-backed engines.
 */

use std::collections::HashMap;

use anyhow::Result;

use crate::database::Repository;
use crate::database::models::{Job, JobStatus, Project};
use crate::engine::{SourceLine, TranslationEngine};
use crate::usage;

/// Segments per engine call. This is a count, deliberately independent from
/// the character-budget chunking the engine applies internally; its purpose
/// is progress granularity, not prompt sizing.
pub const TRANSLATE_BATCH_SIZE: usize = 25;

/// Execute a translate job to completion
pub async fn run_translate_job(
    repo: &Repository,
    engine: &dyn TranslationEngine,
    job: &Job,
    project: &Project,
) -> Result<()> {
    repo.append_job_log(job.id, "Starting translate job").await?;
    repo.set_job_status(job.id, JobStatus::Running).await?;

    let segments = repo.list_segments(project.id).await?;
    if segments.is_empty() {
        repo.append_job_log(job.id, "No segments to translate; nothing to do")
            .await?;
        repo.set_job_progress(job.id, 100).await?;
        repo.set_job_status(job.id, JobStatus::Done).await?;
        return Ok(());
    }

    let id_by_idx: HashMap<i64, i64> = segments.iter().map(|s| (s.idx, s.id)).collect();
    let total = segments.len();
    let mut processed = 0usize;

    for batch in segments.chunks(TRANSLATE_BATCH_SIZE) {
        let lines: Vec<SourceLine> = batch
            .iter()
            .map(|segment| SourceLine {
                idx: segment.idx,
                text: segment.source_text.clone(),
            })
            .collect();

        let results = engine
            .translate_batch(&lines, &project.source_lang, &project.target_lang)
            .await?;

        for result in results {
            let Some(&segment_id) = id_by_idx.get(&result.idx) else {
                repo.append_job_log(job.id, &format!("WARN: no segment for idx {}", result.idx))
                    .await?;
                continue;
            };
            repo.set_segment_draft(segment_id, &result.text, Some(result.confidence))
                .await?;
        }

        processed += batch.len();
        let progress = (processed * 100 / total) as i64;
        repo.set_job_progress(job.id, progress).await?;
        repo.append_job_log(job.id, &format!("Translated {}/{}", processed, total))
            .await?;
    }

    record_usage(repo, engine, job, project).await?;

    repo.set_job_progress(job.id, 100).await?;
    repo.set_job_status(job.id, JobStatus::Done).await?;
    repo.append_job_log(job.id, "Translate job done").await?;
    Ok(())
}

/// Record the run's estimated cost on the monthly ledger.
///
/// Only engines with a billing identity are recorded. An unknown cost model
/// is a configuration error that propagates and fails the job before any
/// usage row is written.
async fn record_usage(
    repo: &Repository,
    engine: &dyn TranslationEngine,
    job: &Job,
    project: &Project,
) -> Result<()> {
    let Some(meta) = engine.usage_meta() else {
        return Ok(());
    };

    let segments = repo.list_segments(project.id).await?;
    let input_tokens = usage::estimate_tokens_from_segments(&segments, |s| Some(&s.source_text));
    let output_tokens = usage::estimate_tokens_from_segments(&segments, |s| s.draft_text.as_deref());

    let cost = usage::estimate_cost(&meta.model, input_tokens, output_tokens)?;

    repo.add_usage(&usage::current_month(), meta.provider, cost.total_usd)
        .await?;
    repo.append_job_log(
        job.id,
        &format!("Estimated {} cost: ${:.4}", meta.provider, cost.total_usd),
    )
    .await?;
    Ok(())
}
