/*!
 * Single-flight job scheduler.
 *
 * A polling loop dequeues at most one job at a time and executes it to
 * completion or failure within the tick. The "is a job executing" flag is
 * private to the scheduler and reachable only through `try_run_next`; a tick
 * that fires while a job is still running is a no-op. Failures are persisted
 * onto the job and never halt future polling.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use log::{debug, error, info};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{consistency, translate};
use crate::database::Repository;
use crate::database::models::{Job, JobType};
use crate::engine::TranslationEngine;

/// Scheduler owning the poll loop and the single-flight discipline
pub struct JobScheduler {
    /// Persistent store, the source of truth for the queue
    repo: Repository,
    /// Engine shared by every job this scheduler runs
    engine: Arc<dyn TranslationEngine>,
    /// Time between polls
    poll_interval: Duration,
    /// In-process single-flight guard; true while a job executes
    running: AtomicBool,
}

impl JobScheduler {
    /// Create a new scheduler
    pub fn new(repo: Repository, engine: Arc<dyn TranslationEngine>, poll_interval: Duration) -> Self {
        Self {
            repo,
            engine,
            poll_interval,
            running: AtomicBool::new(false),
        }
    }

    /// Create a job in queued state with progress 0
    pub async fn enqueue(&self, project_id: i64, job_type: JobType) -> Result<Job> {
        self.repo.create_job(project_id, &job_type.to_string()).await
    }

    /// Dequeue and execute the oldest queued job, if any.
    ///
    /// Returns true when a job was picked up (regardless of whether it ended
    /// `done` or `failed`), false when the queue was empty or another job is
    /// already executing. This is the only entry point that moves a job out
    /// of `queued`.
    pub async fn try_run_next(&self) -> Result<bool> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("A job is already executing; skipping tick");
            return Ok(false);
        }

        let outcome = self.run_next_inner().await;
        self.running.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run_next_inner(&self) -> Result<bool> {
        let Some(job) = self.repo.fetch_next_queued_job().await? else {
            return Ok(false);
        };

        info!("Dequeued job {} ({}) for project {}", job.id, job.job_type, job.project_id);

        if let Err(err) = self.execute(&job).await {
            error!("Job {} failed: {:#}", job.id, err);
            // Persisting the failure is best-effort: a second error here must
            // not mask the original one or take down the loop.
            if let Err(persist_err) = self.repo.fail_job(job.id, &format!("{:#}", err)).await {
                error!(
                    "Could not persist failure of job {}: {:#}",
                    job.id, persist_err
                );
            }
        }
        Ok(true)
    }

    /// Resolve the job type and dispatch to the matching handler
    async fn execute(&self, job: &Job) -> Result<()> {
        let project = self
            .repo
            .get_project(job.project_id)
            .await?
            .ok_or_else(|| anyhow!("Project not found for job {}", job.id))?;

        match job.job_type.parse::<JobType>()? {
            JobType::Translate => {
                translate::run_translate_job(&self.repo, self.engine.as_ref(), job, &project).await
            }
            JobType::Consistency => {
                consistency::run_consistency_job(&self.repo, self.engine.as_ref(), job, &project)
                    .await
            }
        }
    }

    /// Drive the poll loop forever.
    ///
    /// Every tick attempts one dequeue; a tick-level error (e.g. the store
    /// briefly unavailable) is logged and the next tick is scheduled
    /// unconditionally.
    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Job scheduler polling every {:?}",
            self.poll_interval
        );
        loop {
            interval.tick().await;
            if let Err(err) = self.try_run_next().await {
                error!("Scheduler tick failed: {:#}", err);
            }
        }
    }

    /// Spawn the poll loop onto the runtime
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
