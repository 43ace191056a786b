//! Pipeline error types.
//!
//! These errors stay inside the pipeline: the runtime switch controller
//! converts every one of them into a fallback decision, so misconfigured
//! logging never prevents the host process from starting or running.

use std::path::PathBuf;
use thiserror::Error;

/// Destination construction errors (resource failures).
#[derive(Debug, Error)]
pub enum BuildError {
    /// Failed to create the log file's parent directory.
    #[error("failed to create log directory '{path}': {source}")]
    Directory {
        /// The directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to inspect or open the log file.
    #[error("failed to open log file '{path}': {source}")]
    Open {
        /// The log file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for destination construction.
pub type BuildResult<T> = Result<T, BuildError>;
