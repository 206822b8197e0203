/*!
 * Consistency job handler.
 *
 * Slides an overlapping window over a project's draft-bearing segments and
 * asks the engine to reconcile terminology within each window. Every
 * write-back passes hard structural guards; a window that fails is a warning,
 * not a job failure.
 */

use anyhow::Result;

use crate::database::Repository;
use crate::database::models::{Job, JobStatus, Project};
use crate::engine::{ConsistencyItem, TranslationEngine, chunk};

/// Items per consistency window
pub const WINDOW_SIZE: usize = 100;

/// Items shared between consecutive windows, so terms near a boundary are
/// corrected with context from both sides
pub const WINDOW_OVERLAP: usize = 15;

/// Execute a consistency job to completion
pub async fn run_consistency_job(
    repo: &Repository,
    engine: &dyn TranslationEngine,
    job: &Job,
    project: &Project,
) -> Result<()> {
    repo.append_job_log(job.id, "Starting consistency pass").await?;
    repo.set_job_status(job.id, JobStatus::Running).await?;

    let all_segments = repo.list_segments(project.id).await?;

    // Only segments that actually have draft text participate
    let items: Vec<ConsistencyItem> = all_segments
        .iter()
        .filter_map(|segment| {
            let draft = segment.draft_text.as_deref()?;
            if draft.trim().is_empty() {
                return None;
            }
            Some(ConsistencyItem {
                id: segment.id,
                source: segment.source_text.clone(),
                draft: draft.to_string(),
            })
        })
        .collect();

    if items.is_empty() {
        repo.append_job_log(job.id, "No draft text found; nothing to do")
            .await?;
        repo.set_job_progress(job.id, 100).await?;
        repo.set_job_status(job.id, JobStatus::Done).await?;
        return Ok(());
    }

    let windows = chunk::window_ranges(items.len(), WINDOW_SIZE, WINDOW_OVERLAP);
    let total_items: usize = windows.iter().map(|w| w.len()).sum();
    let mut processed = 0usize;
    let mut updated = 0usize;

    for window in windows {
        let slice = &items[window.clone()];

        let corrections = match engine
            .consistency_pass(slice, &project.source_lang, &project.target_lang)
            .await
        {
            Ok(map) => map,
            Err(err) => {
                repo.append_job_log(
                    job.id,
                    &format!(
                        "WARN: consistency window at index {} failed: {}",
                        window.start, err
                    ),
                )
                .await?;
                processed += slice.len();
                report_progress(repo, job, processed, total_items).await?;
                continue;
            }
        };

        // Iterating the slice (not the correction map) means an id the model
        // invented for a segment outside this window can never be applied.
        for item in slice {
            let Some(fixed) = corrections.get(&item.id) else {
                continue;
            };
            // Hard guards: structure safety on the way back in
            if fixed.trim().is_empty() || fixed == &item.draft {
                continue;
            }
            match repo.update_segment_final(project.id, item.id, fixed).await {
                Ok(()) => updated += 1,
                Err(err) => {
                    repo.append_job_log(
                        job.id,
                        &format!("WARN: failed to update segment {}: {}", item.id, err),
                    )
                    .await?;
                }
            }
        }

        processed += slice.len();
        report_progress(repo, job, processed, total_items).await?;
    }

    repo.append_job_log(
        job.id,
        &format!("Consistency pass completed. Updated {} lines", updated),
    )
    .await?;
    repo.set_job_progress(job.id, 100).await?;
    repo.set_job_status(job.id, JobStatus::Done).await?;
    Ok(())
}

/// Report window progress, clamped to 99 until the final window completes
async fn report_progress(
    repo: &Repository,
    job: &Job,
    processed: usize,
    total_items: usize,
) -> Result<()> {
    let progress = ((processed * 100 / total_items) as i64).min(99);
    repo.set_job_progress(job.id, progress).await
}
