//! Scripted transport - in-memory test double
//!
//! Records every command and transfer. Responses come from rules matched by
//! substring; the most recently added matching rule wins, and a command with
//! no matching rule succeeds with empty output. Clones share state, so a test
//! can keep one handle for assertions and give another to the orchestrator.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::ports::{CommandOutput, RemoteConnector, RemoteError, RemoteExecutor};

#[derive(Debug, Default)]
struct ScriptState {
    rules: Vec<(String, CommandOutput)>,
    failing_uploads: Vec<String>,
    connect_error: Option<String>,
    close_error: Option<String>,
    commands: Vec<String>,
    uploads: Vec<(PathBuf, String)>,
    uploaded_text: Vec<(String, String)>,
    connects: usize,
    closed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        // A poisoned lock only means another test thread panicked mid-record.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Answer commands containing `needle` with `stdout`
    pub fn respond(&self, needle: &str, stdout: &str) {
        self.state()
            .rules
            .push((needle.to_string(), CommandOutput::stdout(stdout)));
    }

    /// Answer commands containing `needle` with `stderr`
    pub fn fail(&self, needle: &str, stderr: &str) {
        self.state()
            .rules
            .push((needle.to_string(), CommandOutput::stderr(stderr)));
    }

    /// Fail transfers whose remote path ends with `suffix`
    pub fn fail_upload(&self, suffix: &str) {
        self.state().failing_uploads.push(suffix.to_string());
    }

    pub fn fail_connect(&self, message: &str) {
        self.state().connect_error = Some(message.to_string());
    }

    pub fn fail_close(&self, message: &str) {
        self.state().close_error = Some(message.to_string());
    }

    /// Commands run so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.state().commands.clone()
    }

    /// Successful transfers so far, in order
    pub fn uploads(&self) -> Vec<(PathBuf, String)> {
        self.state().uploads.clone()
    }

    /// Text of the last readable file transferred to `remote`
    pub fn uploaded_content(&self, remote: &str) -> Option<String> {
        self.state()
            .uploaded_text
            .iter()
            .rev()
            .find(|(path, _)| path == remote)
            .map(|(_, text)| text.clone())
    }

    pub fn connect_count(&self) -> usize {
        self.state().connects
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

impl RemoteConnector for ScriptedConnector {
    type Session = ScriptedSession;

    fn destination(&self) -> String {
        "scripted".to_string()
    }

    fn connect(&self) -> Result<ScriptedSession, RemoteError> {
        let mut state = self.state();
        if let Some(message) = &state.connect_error {
            return Err(RemoteError::Connect(message.clone()));
        }
        state.connects += 1;
        state.closed = false;
        Ok(ScriptedSession {
            connector: self.clone(),
        })
    }
}

pub struct ScriptedSession {
    connector: ScriptedConnector,
}

impl RemoteExecutor for ScriptedSession {
    fn run_command(&mut self, command: &str) -> Result<CommandOutput, RemoteError> {
        let mut state = self.connector.state();
        state.commands.push(command.to_string());
        let output = state
            .rules
            .iter()
            .rev()
            .find(|(needle, _)| command.contains(needle.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default();
        Ok(output)
    }

    fn put_file(&mut self, local: &Path, remote: &str) -> Result<(), RemoteError> {
        let mut state = self.connector.state();
        if state
            .failing_uploads
            .iter()
            .any(|suffix| remote.ends_with(suffix.as_str()))
        {
            return Err(RemoteError::Transport("Connection is down".to_string()));
        }
        if let Ok(text) = fs::read_to_string(local) {
            state.uploaded_text.push((remote.to_string(), text));
        }
        state.uploads.push((local.to_path_buf(), remote.to_string()));
        Ok(())
    }

    fn close(self) -> Result<(), RemoteError> {
        let mut state = self.connector.state();
        state.closed = true;
        match &state.close_error {
            Some(message) => Err(RemoteError::Transport(message.clone())),
            None => Ok(()),
        }
    }
}
