//! Local transport
//!
//! Runs remote commands with `sh -c` and uploads with a plain file copy, for
//! deployment roots on the same machine and for integration tests.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::domain::ports::{CommandOutput, RemoteConnector, RemoteError, RemoteExecutor};

use super::process::{self, RunLimits};

#[derive(Debug, Clone, Default)]
pub struct LocalConnector {
    limits: RunLimits,
}

impl LocalConnector {
    pub fn new(limits: RunLimits) -> Self {
        Self { limits }
    }
}

impl RemoteConnector for LocalConnector {
    type Session = LocalSession;

    fn destination(&self) -> String {
        "localhost".to_string()
    }

    fn connect(&self) -> Result<LocalSession, RemoteError> {
        Ok(LocalSession {
            limits: self.limits.clone(),
        })
    }
}

pub struct LocalSession {
    limits: RunLimits,
}

impl RemoteExecutor for LocalSession {
    fn run_command(&mut self, command: &str) -> Result<CommandOutput, RemoteError> {
        let mut sh = Command::new("sh");
        sh.arg("-c").arg(command);
        Ok(process::run(sh, None, &self.limits)?.into_command_output())
    }

    fn put_file(&mut self, local: &Path, remote: &str) -> Result<(), RemoteError> {
        if self.limits.cancel.is_cancelled() {
            return Err(RemoteError::Cancelled);
        }
        let remote = Path::new(remote);
        if let Some(parent) = remote.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(local, remote)
            .map_err(|e| RemoteError::Transport(format!("{}: {e}", local.display())))?;
        Ok(())
    }

    fn close(self) -> Result<(), RemoteError> {
        Ok(())
    }
}
