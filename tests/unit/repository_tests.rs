/*!
 * Tests for the repository contract
 */

use transub::database::Repository;
use transub::database::models::{JobStatus, NewSegment};
use transub::database::repository::LOG_TAIL_MAX_CHARS;

use crate::common::repo_with_project;

fn new_segments(count: usize) -> Vec<NewSegment> {
    (0..count)
        .map(|i| NewSegment {
            idx: i as i64,
            start_ms: (i as i64) * 1000,
            end_ms: (i as i64) * 1000 + 500,
            source_text: format!("replacement {}", i),
        })
        .collect()
}

#[tokio::test]
async fn test_createProject_shouldNormalizeLanguageCodes() {
    let repo = Repository::new_in_memory().unwrap();
    let project = repo.create_project("p", "ENG", "fin").await.unwrap();

    assert_eq!(project.source_lang, "en");
    assert_eq!(project.target_lang, "fi");
}

#[tokio::test]
async fn test_createProject_withBogusLanguage_shouldFail() {
    let repo = Repository::new_in_memory().unwrap();
    assert!(repo.create_project("p", "martian", "fi").await.is_err());
}

#[tokio::test]
async fn test_replaceSegments_shouldSwapWholesale() {
    let (repo, project) = repo_with_project(5).await.unwrap();

    repo.replace_segments(project.id, &new_segments(2)).await.unwrap();

    let segments = repo.list_segments(project.id).await.unwrap();
    assert_eq!(segments.len(), 2);
    assert!(segments.iter().all(|s| s.source_text.starts_with("replacement")));
}

#[tokio::test]
async fn test_replaceSegments_withNonContiguousIndices_shouldRejectAndKeepOld() {
    let (repo, project) = repo_with_project(3).await.unwrap();

    let mut broken = new_segments(2);
    broken[1].idx = 5;
    assert!(repo.replace_segments(project.id, &broken).await.is_err());

    // Old set untouched
    let segments = repo.list_segments(project.id).await.unwrap();
    assert_eq!(segments.len(), 3);
    assert!(segments[0].source_text.starts_with("Line"));
}

#[tokio::test]
async fn test_replaceSegments_withReversedTiming_shouldReject() {
    let (repo, project) = repo_with_project(1).await.unwrap();

    let mut broken = new_segments(1);
    broken[0].start_ms = 900;
    broken[0].end_ms = 100;
    assert!(repo.replace_segments(project.id, &broken).await.is_err());
}

#[tokio::test]
async fn test_setSegmentDraft_withNoneConfidence_shouldKeepPrevious() {
    let (repo, project) = repo_with_project(1).await.unwrap();
    let segment = &repo.list_segments(project.id).await.unwrap()[0];

    repo.set_segment_draft(segment.id, "first draft", Some(0.9)).await.unwrap();
    repo.set_segment_draft(segment.id, "second draft", None).await.unwrap();

    let segment = &repo.list_segments(project.id).await.unwrap()[0];
    assert_eq!(segment.draft_text.as_deref(), Some("second draft"));
    assert_eq!(segment.confidence, Some(0.9));
}

#[tokio::test]
async fn test_updateSegmentFinal_withWrongProject_shouldFailAndNotMutate() {
    let (repo, project) = repo_with_project(1).await.unwrap();
    let segment = &repo.list_segments(project.id).await.unwrap()[0];

    let other = repo.create_project("other", "en", "de").await.unwrap();
    assert!(
        repo.update_segment_final(other.id, segment.id, "hijacked")
            .await
            .is_err()
    );

    let segment = &repo.list_segments(project.id).await.unwrap()[0];
    assert!(segment.final_text.is_none());
}

#[tokio::test]
async fn test_createJob_shouldStartQueuedAtZeroProgress() {
    let (repo, project) = repo_with_project(1).await.unwrap();

    let job = repo.create_job(project.id, "translate").await.unwrap();

    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.progress, 0);
    assert!(job.log_tail.is_empty());
    assert!(job.error.is_none());
}

#[tokio::test]
async fn test_fetchNextQueuedJob_shouldReturnLowestIdFirst() {
    let (repo, project) = repo_with_project(1).await.unwrap();

    let first = repo.create_job(project.id, "translate").await.unwrap();
    let second = repo.create_job(project.id, "consistency").await.unwrap();

    let next = repo.fetch_next_queued_job().await.unwrap().unwrap();
    assert_eq!(next.id, first.id);

    // Once the first leaves queued state, the second is next
    repo.set_job_status(first.id, JobStatus::Running).await.unwrap();
    let next = repo.fetch_next_queued_job().await.unwrap().unwrap();
    assert_eq!(next.id, second.id);
}

#[tokio::test]
async fn test_setJobProgress_shouldNeverMoveBackwards() {
    let (repo, project) = repo_with_project(1).await.unwrap();
    let job = repo.create_job(project.id, "translate").await.unwrap();

    repo.set_job_progress(job.id, 50).await.unwrap();
    repo.set_job_progress(job.id, 30).await.unwrap();

    let job = repo.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.progress, 50);
}

#[tokio::test]
async fn test_appendJobLog_shouldKeepMostRecentCharacters() {
    let (repo, project) = repo_with_project(1).await.unwrap();
    let job = repo.create_job(project.id, "translate").await.unwrap();

    repo.append_job_log(job.id, "the very first line").await.unwrap();
    repo.append_job_log(job.id, &"x".repeat(LOG_TAIL_MAX_CHARS)).await.unwrap();

    let job = repo.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.log_tail.chars().count(), LOG_TAIL_MAX_CHARS);
    assert!(!job.log_tail.contains("the very first line"));
    assert!(job.log_tail.ends_with('x'));
}

#[tokio::test]
async fn test_failJob_shouldCaptureErrorVerbatim() {
    let (repo, project) = repo_with_project(1).await.unwrap();
    let job = repo.create_job(project.id, "translate").await.unwrap();

    repo.fail_job(job.id, "engine exploded: timeout after 180s").await.unwrap();

    let job = repo.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.status.is_terminal());
    assert_eq!(job.error.as_deref(), Some("engine exploded: timeout after 180s"));
}

#[tokio::test]
async fn test_addUsage_shouldAccumulateWithinMonth() {
    let repo = Repository::new_in_memory().unwrap();

    repo.add_usage("2024-03", "openai", 1.5).await.unwrap();
    repo.add_usage("2024-03", "openai", 2.25).await.unwrap();
    repo.add_usage("2024-03", "deepdl", 0.5).await.unwrap();
    repo.add_usage("2024-04", "openai", 9.0).await.unwrap();

    let rows = repo.get_usage("2024-03").await.unwrap();
    assert_eq!(rows.len(), 2);
    let openai = rows.iter().find(|r| r.provider == "openai").unwrap();
    assert!((openai.amount - 3.75).abs() < 1e-9);
}
