//! Source collection errors.
//!
//! The `Display` text of a [`SourceError`] is exactly what clients see under
//! the failed section's `error` key.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    MissingPath(PathBuf),

    #[error("Command `{command}` failed: {reason}")]
    Command { command: String, reason: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{source_name} timed out after {limit:?}")]
    Timeout { source_name: String, limit: Duration },

    #[error("{source_name} panicked: {message}")]
    Panicked {
        source_name: String,
        message: String,
    },
}

impl SourceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn command(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            reason: reason.into(),
        }
    }
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;
