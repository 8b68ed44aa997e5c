//! Error types for the reactive runtime.
//!
//! Reading and writing reactive values never fails. Errors only come from
//! driving the runtime: flushing and loading its configuration.

use thiserror::Error;

/// Errors reported by the reactive runtime.
#[derive(Debug, Error)]
pub enum ReactiveError {
    /// `Runtime::flush` was called from inside an invalidation callback.
    #[error("flush called while a flush is already in progress")]
    ReentrantFlush,

    /// Invalidations kept queueing new work past the configured pass limit.
    #[error("flush did not settle after {passes} passes")]
    FlushLimitExceeded { passes: usize },

    /// The runtime configuration could not be parsed.
    #[error("invalid runtime configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias using [`ReactiveError`].
pub type Result<T, E = ReactiveError> = std::result::Result<T, E>;
