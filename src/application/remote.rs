//! Shared context for the steps of one run
//!
//! Bundles what every step needs besides the session itself: the remote
//! layout, the event sink and the cancellation token. The session is passed
//! explicitly to each call.

use crate::domain::ports::{DeployEvent, DeployEventSink, RemoteExecutor};
use crate::domain::value_objects::{CancellationToken, RemoteLayout};
use crate::error::{SlipwayError, SlipwayResult};

#[derive(Clone, Copy)]
pub struct RemoteContext<'a> {
    pub layout: &'a RemoteLayout,
    pub events: &'a dyn DeployEventSink,
    pub cancel: &'a CancellationToken,
}

impl<'a> RemoteContext<'a> {
    pub fn new(
        layout: &'a RemoteLayout,
        events: &'a dyn DeployEventSink,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            layout,
            events,
            cancel,
        }
    }

    pub fn emit(&self, event: DeployEvent) {
        self.events.on_event(event);
    }

    pub fn check_cancelled(&self) -> SlipwayResult<()> {
        if self.cancel.is_cancelled() {
            Err(SlipwayError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Run `command` and return its stdout.
    ///
    /// Any stderr output fails the command, whatever the exit status.
    pub fn run<S>(&self, session: &mut S, command: &str) -> SlipwayResult<String>
    where
        S: RemoteExecutor + ?Sized,
    {
        self.check_cancelled()?;
        tracing::debug!(%command, "running remote command");

        let output = session
            .run_command(command)
            .map_err(|e| SlipwayError::from_remote(command, e))?;

        if !output.is_success() {
            tracing::debug!(stderr = %output.stderr, "remote command wrote to stderr");
            return Err(SlipwayError::Command {
                command: command.to_string(),
                stderr: output.stderr.trim_end().to_string(),
            });
        }

        Ok(output.stdout)
    }
}
