//! RemoteExecutor port - abstraction over the remote shell/file-transfer channel
//!
//! The domain never talks to SSH directly. A `RemoteConnector` opens a
//! session and hands back an explicit `RemoteExecutor` handle; that handle is
//! threaded through every step of a run and consumed by `close`.
//!
//! Implementations:
//! - `SshConnector` - OpenSSH client over a shared control socket
//! - `LocalConnector` - same-host `sh -c` and file copies
//! - `ScriptedConnector` - in-memory double with scripted responses

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

/// Captured output of a remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn stderr(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// The only success signal the core trusts: stderr is empty.
    pub fn is_success(&self) -> bool {
        self.stderr.is_empty()
    }
}

/// Transport-level failures
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Session could not be established
    #[error("{0}")]
    Connect(String),

    /// Channel failure while running a command or transferring a file
    #[error("{0}")]
    Transport(String),

    /// Local I/O failure (spawning a process, reading a local file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The per-operation deadline elapsed; the operation was killed
    #[error("timed out after {}s", .after.as_secs())]
    TimedOut { after: Duration },

    /// The run was cancelled while the operation was in flight
    #[error("cancelled")]
    Cancelled,
}

/// Opens remote sessions
pub trait RemoteConnector {
    type Session: RemoteExecutor;

    /// Human-readable destination (for events and errors)
    fn destination(&self) -> String;

    /// Establish a session. Nothing on the remote host is touched yet.
    fn connect(&self) -> Result<Self::Session, RemoteError>;
}

/// An established session
///
/// Methods take `&mut self`: a session serves one command or transfer at a
/// time, in the order issued.
pub trait RemoteExecutor {
    /// Run a shell command and capture its output.
    ///
    /// An `Err` means the command could not be run at all; a command that ran
    /// and failed reports through `CommandOutput::stderr`.
    fn run_command(&mut self, command: &str) -> Result<CommandOutput, RemoteError>;

    /// Copy a local file to an absolute remote path.
    fn put_file(&mut self, local: &Path, remote: &str) -> Result<(), RemoteError>;

    /// Dispose of the session.
    fn close(self) -> Result<(), RemoteError>
    where
        Self: Sized;
}
