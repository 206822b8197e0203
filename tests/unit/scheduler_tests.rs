/*!
 * Tests for the single-flight job scheduler
 */

use std::sync::Arc;
use std::time::Duration;

use transub::database::models::{JobStatus, JobType};
use transub::engine::MockEngine;
use transub::jobs::JobScheduler;

use crate::common::repo_with_project;

fn scheduler_over(repo: transub::database::Repository) -> JobScheduler {
    JobScheduler::new(repo, Arc::new(MockEngine::new()), Duration::from_millis(800))
}

#[test]
fn test_tryRunNext_withEmptyQueue_shouldBeNoOp() {
    let result = tokio_test::block_on(async {
        let (repo, _project) = repo_with_project(0).await.unwrap();
        let scheduler = scheduler_over(repo);
        scheduler.try_run_next().await
    });

    assert!(!result.unwrap());
}

#[tokio::test]
async fn test_tryRunNext_shouldRunTranslateJobToDone() {
    let (repo, project) = repo_with_project(4).await.unwrap();
    let scheduler = scheduler_over(repo.clone());

    let job = scheduler.enqueue(project.id, JobType::Translate).await.unwrap();
    assert!(scheduler.try_run_next().await.unwrap());

    let job = repo.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Done);
    assert_eq!(job.progress, 100);

    let segments = repo.list_segments(project.id).await.unwrap();
    assert!(segments.iter().all(|s| s.draft_text.is_some()));
}

#[tokio::test]
async fn test_tryRunNext_shouldProcessJobsInFifoOrder() {
    let (repo, project) = repo_with_project(1).await.unwrap();
    let scheduler = scheduler_over(repo.clone());

    let first = scheduler.enqueue(project.id, JobType::Translate).await.unwrap();
    let second = scheduler.enqueue(project.id, JobType::Consistency).await.unwrap();

    assert!(scheduler.try_run_next().await.unwrap());
    assert_eq!(
        repo.get_job(first.id).await.unwrap().unwrap().status,
        JobStatus::Done
    );
    assert_eq!(
        repo.get_job(second.id).await.unwrap().unwrap().status,
        JobStatus::Queued
    );

    assert!(scheduler.try_run_next().await.unwrap());
    assert_eq!(
        repo.get_job(second.id).await.unwrap().unwrap().status,
        JobStatus::Done
    );
}

#[tokio::test]
async fn test_tryRunNext_withUnknownJobType_shouldFailThatJobOnly() {
    let (repo, project) = repo_with_project(1).await.unwrap();
    let scheduler = scheduler_over(repo.clone());

    let bad = repo.create_job(project.id, "reticulate").await.unwrap();
    let good = scheduler.enqueue(project.id, JobType::Translate).await.unwrap();

    assert!(scheduler.try_run_next().await.unwrap());
    let bad = repo.get_job(bad.id).await.unwrap().unwrap();
    assert_eq!(bad.status, JobStatus::Failed);
    assert!(bad.error.unwrap().contains("Unknown job type"));

    // The failure never halts polling; the next job still runs
    assert!(scheduler.try_run_next().await.unwrap());
    assert_eq!(
        repo.get_job(good.id).await.unwrap().unwrap().status,
        JobStatus::Done
    );
}

#[tokio::test]
async fn test_zeroSegmentTranslateJob_shouldCompleteDoneWithLogNote() {
    let (repo, project) = repo_with_project(0).await.unwrap();
    let scheduler = scheduler_over(repo.clone());

    let job = scheduler.enqueue(project.id, JobType::Translate).await.unwrap();
    assert!(scheduler.try_run_next().await.unwrap());

    let job = repo.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Done);
    assert_eq!(job.progress, 100);
    assert!(job.log_tail.contains("nothing to do"));

    let segments = repo.list_segments(project.id).await.unwrap();
    assert!(segments.is_empty());
}

#[tokio::test]
async fn test_terminalJobs_shouldNeverBeDequeuedAgain() {
    let (repo, project) = repo_with_project(1).await.unwrap();
    let scheduler = scheduler_over(repo.clone());

    scheduler.enqueue(project.id, JobType::Translate).await.unwrap();
    assert!(scheduler.try_run_next().await.unwrap());

    // Queue is empty now: done jobs stay done
    assert!(!scheduler.try_run_next().await.unwrap());
}
