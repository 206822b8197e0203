use anyhow::{Context, Result, anyhow};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::database::models::JobType;
use crate::database::{DatabaseConnection, Repository};
use crate::engine::create_engine;
use crate::jobs::JobScheduler;
use crate::subtitle_processor;
use crate::usage;

// @module: Application controller wiring CLI commands to the pipeline

/// Main application controller for the translation pipeline
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Repository over the configured database
    repo: Repository,
}

impl Controller {
    // @method: Create a controller over the given database path
    pub fn new(config: Config, db_path: Option<&Path>) -> Result<Self> {
        let db = match db_path {
            Some(path) => DatabaseConnection::new(path)?,
            None => DatabaseConnection::new_default()?,
        };
        Ok(Self {
            config,
            repo: Repository::new(db),
        })
    }

    /// Create a controller over an in-memory database (for testing)
    pub fn new_in_memory(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            repo: Repository::new_in_memory()?,
        })
    }

    /// Access the repository, for tests and embedding
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Run the scheduler loop until interrupted
    pub async fn serve(&self) -> Result<()> {
        self.config.validate()?;
        let engine = create_engine(&self.config.engine)?;
        let scheduler = Arc::new(JobScheduler::new(
            self.repo.clone(),
            engine,
            Duration::from_millis(self.config.poll_interval_ms),
        ));

        let handle = Arc::clone(&scheduler).spawn();
        info!(
            "Serving with {} engine; press Ctrl-C to stop",
            self.config.engine.provider
        );

        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for shutdown signal")?;
        info!("Shutting down");
        handle.abort();
        Ok(())
    }

    /// Import an SRT file as a new project, optionally enqueueing a
    /// translate job for it
    pub async fn import(
        &self,
        file: &Path,
        name: Option<String>,
        source_lang: &str,
        target_lang: &str,
        enqueue_translate: bool,
    ) -> Result<i64> {
        if crate::language_utils::language_codes_match(source_lang, target_lang) {
            return Err(anyhow!(
                "Source and target language are the same: {} -> {}",
                source_lang,
                target_lang
            ));
        }

        let content = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read subtitle file {:?}", file))?;
        let segments = subtitle_processor::parse_srt(&content)?;

        let name = name.unwrap_or_else(|| {
            file.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "untitled".to_string())
        });

        let project = self.repo.create_project(&name, source_lang, target_lang).await?;
        self.repo.replace_segments(project.id, &segments).await?;
        info!(
            "Imported {} segments into project {} ({})",
            segments.len(),
            project.id,
            project.name
        );

        if enqueue_translate {
            let job = self
                .repo
                .create_job(project.id, &JobType::Translate.to_string())
                .await?;
            info!("Enqueued translate job {}", job.id);
        }

        Ok(project.id)
    }

    /// Enqueue a job for an existing project
    pub async fn enqueue(&self, project_id: i64, job_type: JobType) -> Result<i64> {
        let project = self
            .repo
            .get_project(project_id)
            .await?
            .ok_or_else(|| anyhow!("No project with id {}", project_id))?;
        let job = self
            .repo
            .create_job(project.id, &job_type.to_string())
            .await?;
        info!("Enqueued {} job {} for project {}", job_type, job.id, project.id);
        Ok(job.id)
    }

    /// Export a project's current segment state as SRT
    pub async fn export(&self, project_id: i64, out: Option<PathBuf>) -> Result<()> {
        let project = self
            .repo
            .get_project(project_id)
            .await?
            .ok_or_else(|| anyhow!("No project with id {}", project_id))?;
        let segments = self.repo.list_segments(project.id).await?;
        let srt = subtitle_processor::write_srt(&segments);

        match out {
            Some(path) => {
                std::fs::write(&path, srt)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                info!("Exported {} segments to {:?}", segments.len(), path);
            }
            None => print!("{}", srt),
        }
        Ok(())
    }

    /// Print a project's jobs, newest first
    pub async fn print_jobs(&self, project_id: i64) -> Result<()> {
        let jobs = self.repo.list_jobs(project_id).await?;
        if jobs.is_empty() {
            println!("No jobs for project {}", project_id);
            return Ok(());
        }
        for job in jobs {
            println!(
                "#{} {} {} {}% (updated {})",
                job.id, job.job_type, job.status, job.progress, job.updated_at
            );
            if let Some(error) = job.error {
                println!("    error: {}", error);
            }
        }
        Ok(())
    }

    /// Print the usage ledger for a month (current month when omitted)
    pub async fn print_usage(&self, month: Option<String>) -> Result<()> {
        let month = month.unwrap_or_else(usage::current_month);
        let rows = self.repo.get_usage(&month).await?;
        if rows.is_empty() {
            println!("No usage recorded for {}", month);
            return Ok(());
        }
        for row in rows {
            println!("{} {:<10} ${:.4}", row.month, row.provider, row.amount);
        }
        Ok(())
    }
}
