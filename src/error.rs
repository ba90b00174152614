//! Error types for Slipway
//!
//! Library code returns `SlipwayError`; the binary wraps it in `anyhow`.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::domain::ports::RemoteError;

/// Result type alias for Slipway operations
pub type SlipwayResult<T> = Result<T, SlipwayError>;

/// Main error type for Slipway operations
///
/// Every variant terminates the run that produced it. A malformed ledger is
/// not an error here: the ledger store recovers from it with a warning.
#[derive(Error, Debug)]
pub enum SlipwayError {
    /// The remote session could not be established
    #[error("could not connect to {destination}: {message}")]
    Connection {
        destination: String,
        message: String,
    },

    /// A remote command wrote to stderr
    #[error("remote command failed: {stderr}\n  command: {command}")]
    Command { command: String, stderr: String },

    /// A remote command could not be run at all (channel dropped, spawn failure)
    #[error("remote command could not be run: {source}\n  command: {command}")]
    Transport {
        command: String,
        #[source]
        source: RemoteError,
    },

    /// A file transfer failed; remaining transfers were not attempted
    #[error("upload of {} failed: {source}", .file.display())]
    Upload {
        file: PathBuf,
        #[source]
        source: RemoteError,
    },

    /// The requested revision has no release directory
    #[error("revision '{revision}' has no release directory at {release_dir}")]
    ActivationTargetMissing {
        revision: String,
        release_dir: String,
    },

    /// Revision id cannot be used as a directory name
    #[error("invalid revision id '{revision}': {reason}")]
    InvalidRevisionId { revision: String, reason: String },

    /// A remote operation exceeded the configured deadline
    #[error("remote operation timed out after {}s: {operation}", .after.as_secs())]
    Timeout { operation: String, after: Duration },

    /// The run was cancelled by the operator
    #[error("deploy cancelled")]
    Cancelled,

    /// Invalid or incomplete configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("invalid config file {}: {message}", .file.display())]
    InvalidConfig { file: PathBuf, message: String },

    /// Local artifact directory is missing
    #[error("artifact directory not found: {}", .path.display())]
    ArtifactsNotFound { path: PathBuf },

    /// Ignore pattern could not be compiled
    #[error(transparent)]
    Ignore(#[from] crate::domain::value_objects::IgnoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::domain::value_objects::RevisionIdError> for SlipwayError {
    fn from(err: crate::domain::value_objects::RevisionIdError) -> Self {
        SlipwayError::InvalidRevisionId {
            revision: err.revision,
            reason: err.reason.to_string(),
        }
    }
}

impl SlipwayError {
    /// Map a transport failure of `command` into the matching run error.
    ///
    /// Deadline and cancellation failures keep their own variants so callers
    /// can tell an operator abort from a broken channel.
    pub fn from_remote(command: impl Into<String>, source: RemoteError) -> Self {
        let command = command.into();
        match source {
            RemoteError::TimedOut { after } => SlipwayError::Timeout {
                operation: command,
                after,
            },
            RemoteError::Cancelled => SlipwayError::Cancelled,
            source => SlipwayError::Transport { command, source },
        }
    }
}
