/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access. Every
 * method is individually atomic; multi-statement writes (segment
 * replacement) run inside a transaction.
 */

use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::connection::DatabaseConnection;
use super::models::{Job, JobStatus, NewSegment, Project, Segment, UsageRow};
use crate::language_utils;

/// Maximum number of characters retained in a job's log tail
pub const LOG_TAIL_MAX_CHARS: usize = 8000;

/// Keep the most recent `max_chars` characters of a log tail.
///
/// Trimming happens on character boundaries so a multi-byte character at the
/// cut point is dropped whole instead of splitting the string mid-codepoint.
fn log_tail_suffix(tail: &str, max_chars: usize) -> &str {
    let total = tail.chars().count();
    if total <= max_chars {
        return tail;
    }
    let skip = total - max_chars;
    match tail.char_indices().nth(skip) {
        Some((byte_idx, _)) => &tail[byte_idx..],
        None => "",
    }
}

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        source_lang: row.get(2)?,
        target_lang: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn segment_from_row(row: &Row<'_>) -> rusqlite::Result<Segment> {
    Ok(Segment {
        id: row.get(0)?,
        project_id: row.get(1)?,
        idx: row.get(2)?,
        start_ms: row.get(3)?,
        end_ms: row.get(4)?,
        source_text: row.get(5)?,
        draft_text: row.get(6)?,
        final_text: row.get(7)?,
        confidence: row.get(8)?,
    })
}

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<Job> {
    Ok(Job {
        id: row.get(0)?,
        project_id: row.get(1)?,
        job_type: row.get(2)?,
        status: row
            .get::<_, String>(3)?
            .parse()
            .unwrap_or(JobStatus::Failed),
        progress: row.get(4)?,
        log_tail: row.get(5)?,
        error: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

const PROJECT_COLUMNS: &str = "id, name, source_lang, target_lang, created_at";
const SEGMENT_COLUMNS: &str =
    "id, project_id, idx, start_ms, end_ms, source_text, draft_text, final_text, confidence";
const JOB_COLUMNS: &str =
    "id, project_id, type, status, progress, log_tail, error, created_at, updated_at";

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Access the underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Project Operations
    // =========================================================================

    /// Create a new project, normalizing its language codes
    pub async fn create_project(
        &self,
        name: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Project> {
        let name = name.to_string();
        let source_lang = language_utils::normalize_lang_code(source_lang)?;
        let target_lang = language_utils::normalize_lang_code(target_lang)?;

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "INSERT INTO projects (name, source_lang, target_lang) VALUES (?1, ?2, ?3)",
                    params![name, source_lang, target_lang],
                )?;
                let id = conn.last_insert_rowid();
                Self::get_project_sync(conn, id)?
                    .ok_or_else(|| anyhow!("Project {} vanished after insert", id))
            })
            .await
    }

    /// Get a project by id
    pub async fn get_project(&self, id: i64) -> Result<Option<Project>> {
        self.db
            .execute_async(move |conn| Self::get_project_sync(conn, id))
            .await
    }

    fn get_project_sync(conn: &Connection, id: i64) -> Result<Option<Project>> {
        let result = conn
            .query_row(
                &format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS),
                [id],
                project_from_row,
            )
            .optional()?;
        Ok(result)
    }

    /// List all projects, newest first
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM projects ORDER BY id DESC",
                    PROJECT_COLUMNS
                ))?;
                let rows = stmt
                    .query_map([], project_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
    }

    // =========================================================================
    // Segment Operations
    // =========================================================================

    /// Replace a project's segment set wholesale, atomically.
    ///
    /// Old segments are deleted and new ones inserted in a single
    /// transaction; a failure leaves the previous set untouched. Incoming
    /// indices must be contiguous from 0 and every cue must satisfy
    /// start_ms <= end_ms.
    pub async fn replace_segments(&self, project_id: i64, segments: &[NewSegment]) -> Result<()> {
        for (expected, segment) in segments.iter().enumerate() {
            if segment.idx != expected as i64 {
                return Err(anyhow!(
                    "Segment indices must be contiguous from 0: expected {}, got {}",
                    expected,
                    segment.idx
                ));
            }
            if segment.end_ms < segment.start_ms {
                return Err(anyhow!(
                    "Segment {} has end_ms {} before start_ms {}",
                    segment.idx,
                    segment.end_ms,
                    segment.start_ms
                ));
            }
        }

        let segments = segments.to_vec();
        self.db
            .transaction_async(move |tx| {
                tx.execute("DELETE FROM segments WHERE project_id = ?1", [project_id])?;
                let mut stmt = tx.prepare(
                    "INSERT INTO segments (project_id, idx, start_ms, end_ms, source_text)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;
                for segment in &segments {
                    stmt.execute(params![
                        project_id,
                        segment.idx,
                        segment.start_ms,
                        segment.end_ms,
                        segment.source_text,
                    ])?;
                }
                Ok(())
            })
            .await
    }

    /// List a project's segments ordered by index
    pub async fn list_segments(&self, project_id: i64) -> Result<Vec<Segment>> {
        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM segments WHERE project_id = ?1 ORDER BY idx ASC",
                    SEGMENT_COLUMNS
                ))?;
                let rows = stmt
                    .query_map([project_id], segment_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
    }

    /// Write a segment's draft text and confidence.
    ///
    /// Confidence keeps its previous value when the caller passes None, so a
    /// re-translate without confidence does not erase an earlier score.
    pub async fn set_segment_draft(
        &self,
        segment_id: i64,
        draft_text: &str,
        confidence: Option<f64>,
    ) -> Result<()> {
        let draft_text = draft_text.to_string();
        self.db
            .execute_async(move |conn| {
                let changed = conn.execute(
                    "UPDATE segments
                     SET draft_text = ?1, confidence = COALESCE(?2, confidence)
                     WHERE id = ?3",
                    params![draft_text, confidence, segment_id],
                )?;
                if changed == 0 {
                    return Err(anyhow!("No segment with id {}", segment_id));
                }
                Ok(())
            })
            .await
    }

    /// Write a segment's final text, scoped by project to avoid applying a
    /// correction meant for a segment of another project.
    pub async fn update_segment_final(
        &self,
        project_id: i64,
        segment_id: i64,
        final_text: &str,
    ) -> Result<()> {
        let final_text = final_text.to_string();
        self.db
            .execute_async(move |conn| {
                let changed = conn.execute(
                    "UPDATE segments SET final_text = ?1 WHERE project_id = ?2 AND id = ?3",
                    params![final_text, project_id, segment_id],
                )?;
                if changed == 0 {
                    return Err(anyhow!(
                        "No segment with id {} in project {}",
                        segment_id,
                        project_id
                    ));
                }
                Ok(())
            })
            .await
    }

    // =========================================================================
    // Job Operations
    // =========================================================================

    /// Create a job in queued state with progress 0.
    ///
    /// The type is stored as given; the scheduler rejects types it does not
    /// recognize when the job is dequeued, not here.
    pub async fn create_job(&self, project_id: i64, job_type: &str) -> Result<Job> {
        let job_type = job_type.to_string();
        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "INSERT INTO jobs (project_id, type, status, progress) VALUES (?1, ?2, 'queued', 0)",
                    params![project_id, job_type],
                )?;
                let id = conn.last_insert_rowid();
                Self::get_job_sync(conn, id)?.ok_or_else(|| anyhow!("Job {} vanished after insert", id))
            })
            .await
    }

    /// Get a job by id
    pub async fn get_job(&self, id: i64) -> Result<Option<Job>> {
        self.db
            .execute_async(move |conn| Self::get_job_sync(conn, id))
            .await
    }

    fn get_job_sync(conn: &Connection, id: i64) -> Result<Option<Job>> {
        let result = conn
            .query_row(
                &format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS),
                [id],
                job_from_row,
            )
            .optional()?;
        Ok(result)
    }

    /// List a project's jobs, newest first
    pub async fn list_jobs(&self, project_id: i64) -> Result<Vec<Job>> {
        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM jobs WHERE project_id = ?1 ORDER BY id DESC",
                    JOB_COLUMNS
                ))?;
                let rows = stmt
                    .query_map([project_id], job_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
    }

    /// Fetch the single oldest queued job, lowest id first
    pub async fn fetch_next_queued_job(&self) -> Result<Option<Job>> {
        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        &format!(
                            "SELECT {} FROM jobs WHERE status = 'queued' ORDER BY id ASC LIMIT 1",
                            JOB_COLUMNS
                        ),
                        [],
                        job_from_row,
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// Set a job's status
    pub async fn set_job_status(&self, id: i64, status: JobStatus) -> Result<()> {
        let status = status.to_string();
        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "UPDATE jobs SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
                    params![status, id],
                )?;
                Ok(())
            })
            .await
    }

    /// Set a job's progress.
    ///
    /// Persisted monotonically: a value lower than the stored one is ignored,
    /// so progress can never move backwards within a run.
    pub async fn set_job_progress(&self, id: i64, progress: i64) -> Result<()> {
        let progress = progress.clamp(0, 100);
        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "UPDATE jobs SET progress = MAX(progress, ?1), updated_at = datetime('now')
                     WHERE id = ?2",
                    params![progress, id],
                )?;
                Ok(())
            })
            .await
    }

    /// Append a line to a job's bounded log tail, keeping the most recent
    /// characters when the tail overflows
    pub async fn append_job_log(&self, id: i64, line: &str) -> Result<()> {
        let line = line.to_string();
        self.db
            .execute_async(move |conn| {
                let tail: String = conn
                    .query_row("SELECT log_tail FROM jobs WHERE id = ?1", [id], |row| {
                        row.get(0)
                    })
                    .optional()?
                    .ok_or_else(|| anyhow!("No job with id {}", id))?;

                let mut appended = tail;
                if !appended.is_empty() {
                    appended.push('\n');
                }
                appended.push_str(&line);
                let trimmed = log_tail_suffix(&appended, LOG_TAIL_MAX_CHARS);

                conn.execute(
                    "UPDATE jobs SET log_tail = ?1, updated_at = datetime('now') WHERE id = ?2",
                    params![trimmed, id],
                )?;
                Ok(())
            })
            .await
    }

    /// Mark a job failed with its error captured verbatim
    pub async fn fail_job(&self, id: i64, error: &str) -> Result<()> {
        let error = error.to_string();
        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "UPDATE jobs SET status = 'failed', error = ?1, updated_at = datetime('now')
                     WHERE id = ?2",
                    params![error, id],
                )?;
                Ok(())
            })
            .await
    }

    // =========================================================================
    // Usage Operations
    // =========================================================================

    /// Add to the monthly usage ledger for a provider.
    ///
    /// Accumulates: two additions for the same (month, provider) sum rather
    /// than overwrite.
    pub async fn add_usage(&self, month: &str, provider: &str, amount: f64) -> Result<()> {
        let month = month.to_string();
        let provider = provider.to_string();
        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "INSERT INTO usage_monthly (month, provider, amount, updated_at)
                     VALUES (?1, ?2, ?3, datetime('now'))
                     ON CONFLICT(month, provider)
                     DO UPDATE SET
                       amount = amount + excluded.amount,
                       updated_at = datetime('now')",
                    params![month, provider, amount],
                )?;
                Ok(())
            })
            .await
    }

    /// Get all usage rows for a month
    pub async fn get_usage(&self, month: &str) -> Result<Vec<UsageRow>> {
        let month = month.to_string();
        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT month, provider, amount, updated_at
                     FROM usage_monthly WHERE month = ?1 ORDER BY provider ASC",
                )?;
                let rows = stmt
                    .query_map([month], |row| {
                        Ok(UsageRow {
                            month: row.get(0)?,
                            provider: row.get(1)?,
                            amount: row.get(2)?,
                            updated_at: row.get(3)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
    }
}
