/*!
 * Error types for the transub application.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised by translation engine implementations
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine was constructed without the credentials it needs.
    /// Configuration error: never retried.
    #[error("API key missing for provider '{0}'")]
    MissingApiKey(String),

    /// A prompt exceeded the hard size ceiling for its operation.
    /// Configuration error: the caller must chunk smaller, never retried.
    #[error("prompt too large: {size} chars exceeds ceiling of {ceiling}")]
    PromptTooLarge {
        /// Assembled prompt size in characters
        size: usize,
        /// Hard ceiling for this operation
        ceiling: usize,
    },

    /// Error when making an API request fails (network, timeout)
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error when the API response could not be interpreted
    #[error("failed to parse API response: {0}")]
    ParseError(String),
}

impl EngineError {
    /// Whether a failed attempt with this error may be retried.
    ///
    /// Configuration errors fail fast; everything that came out of the
    /// network or the model text is considered transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            EngineError::MissingApiKey(_) | EngineError::PromptTooLarge { .. }
        )
    }
}

/// Errors that can occur during usage and cost accounting
#[derive(Error, Debug)]
pub enum UsageError {
    /// No cost table entry exists for the model. Configuration error.
    #[error("unknown cost model: {0}")]
    UnknownModel(String),
}

/// Errors that can occur while parsing or writing subtitle files
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// A cue timestamp did not match the expected HH:MM:SS,mmm shape
    #[error("bad SRT timestamp: {0}")]
    BadTimestamp(String),

    /// A cue ended before it started
    #[error("invalid time range: end {end_ms}ms < start {start_ms}ms")]
    InvalidTimeRange {
        /// Cue start in milliseconds
        start_ms: i64,
        /// Cue end in milliseconds
        end_ms: i64,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a translation engine
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// Error from usage accounting
    #[error("usage error: {0}")]
    Usage(#[from] UsageError),

    /// Error from subtitle processing
    #[error("subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from a file operation
    #[error("file error: {0}")]
    File(String),

    /// Any other error
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
