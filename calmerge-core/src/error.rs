//! Error types for the calmerge ecosystem.

use thiserror::Error;

/// Errors that can occur while aggregating calendar feeds.
///
/// Config, Fetch and Parse failures are per-source: callers report them
/// and continue with the remaining sources. Publish failures abort the
/// run, since a partial publish would leave the remote inconsistent.
#[derive(Error, Debug)]
pub enum CalMergeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Calendar parse error: {0}")]
    Parse(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for calmerge operations.
pub type CalMergeResult<T> = Result<T, CalMergeError>;
