/*!
 * Database entity models.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// A subtitle translation project owning segments and jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Row id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Source language code (ISO 639-1)
    pub source_lang: String,
    /// Target language code (ISO 639-1)
    pub target_lang: String,
    /// Creation timestamp
    pub created_at: String,
}

/// One timed subtitle line with its text variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Row id
    pub id: i64,
    /// Owning project
    pub project_id: i64,
    /// Stable ordering key, unique and contiguous from 0 per project
    pub idx: i64,
    /// Cue start in milliseconds
    pub start_ms: i64,
    /// Cue end in milliseconds, >= start_ms
    pub end_ms: i64,
    /// Original text, immutable once set
    pub source_text: String,
    /// Machine translation pending review, written by translate jobs
    pub draft_text: Option<String>,
    /// Approved or consistency-corrected text, authoritative for export
    pub final_text: Option<String>,
    /// Model confidence, only ever set alongside draft_text
    pub confidence: Option<f64>,
}

/// A segment about to be inserted during wholesale replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSegment {
    /// Ordering key, contiguous from 0
    pub idx: i64,
    /// Cue start in milliseconds
    pub start_ms: i64,
    /// Cue end in milliseconds
    pub end_ms: i64,
    /// Original text
    pub source_text: String,
}

/// Job type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Batch-translate a project's segments into drafts
    Translate,
    /// Reconcile terminology across existing drafts
    Consistency,
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobType::Translate => write!(f, "translate"),
            JobType::Consistency => write!(f, "consistency"),
        }
    }
}

impl std::str::FromStr for JobType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "translate" => Ok(JobType::Translate),
            "consistency" => Ok(JobType::Consistency),
            _ => Err(anyhow::anyhow!("Unknown job type: {}", s)),
        }
    }
}

/// Job status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting for the scheduler to pick it up
    Queued,
    /// Currently executing
    Running,
    /// Completed successfully; terminal
    Done,
    /// Terminated by an error; terminal
    Failed,
}

impl JobStatus {
    /// Whether this status permits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Done => write!(f, "done"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queued" => Ok(JobStatus::Queued),
            "running" => Ok(JobStatus::Running),
            "done" => Ok(JobStatus::Done),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid job status: {}", s)),
        }
    }
}

/// One asynchronous unit of work against a project's segments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Row id; also the FIFO ordering key for the queue
    pub id: i64,
    /// Owning project
    pub project_id: i64,
    /// What kind of work this job performs
    pub job_type: String,
    /// Lifecycle state
    pub status: JobStatus,
    /// 0-100, monotonically non-decreasing within a run
    pub progress: i64,
    /// Most recent ~8000 characters of the run's log lines
    pub log_tail: String,
    /// Failure message, set only when status is failed
    pub error: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last status/progress/log change timestamp
    pub updated_at: String,
}

/// One accumulated monthly cost row for a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRow {
    /// Calendar month, "YYYY-MM"
    pub month: String,
    /// Provider identifier, e.g. "openai"
    pub provider: String,
    /// Accumulated estimated cost in USD
    pub amount: f64,
    /// Last accumulation timestamp
    pub updated_at: String,
}
