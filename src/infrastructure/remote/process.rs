//! Child process runner with a deadline and cancellation
//!
//! `std::process` has no timed wait, so the child is polled with `try_wait`
//! while two threads drain its pipes. A child that outlives its deadline, or
//! whose run is cancelled, is killed.

use std::fs::File;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::domain::ports::{CommandOutput, RemoteError};
use crate::domain::value_objects::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Deadline and cancellation applied to every spawned process
#[derive(Debug, Clone, Default)]
pub struct RunLimits {
    /// `None` waits forever
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

impl RunLimits {
    pub fn new(timeout: Option<Duration>, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }
}

#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Convert to the stderr-based result the core understands.
    ///
    /// A non-zero exit with a silent stderr still has to fail, so the exit
    /// status is reported on stderr in that case.
    pub fn into_command_output(self) -> CommandOutput {
        let stderr = if self.stderr.is_empty() && !self.status.success() {
            format!("command exited with {}", self.status)
        } else {
            self.stderr
        };
        CommandOutput {
            stdout: self.stdout,
            stderr,
        }
    }
}

/// Spawn `command`, feed it `stdin` (or nothing), and wait within `limits`.
pub fn run(
    mut command: Command,
    stdin: Option<File>,
    limits: &RunLimits,
) -> Result<ProcessOutput, RemoteError> {
    if limits.cancel.is_cancelled() {
        return Err(RemoteError::Cancelled);
    }

    command
        .stdin(stdin.map(Stdio::from).unwrap_or_else(Stdio::null))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn()?;
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if limits.cancel.is_cancelled() {
            kill(&mut child);
            return Err(RemoteError::Cancelled);
        }
        if let Some(after) = limits.timeout {
            if started.elapsed() >= after {
                kill(&mut child);
                return Err(RemoteError::TimedOut { after });
            }
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(ProcessOutput {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

fn drain<R>(pipe: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        buffer
    })
}

fn collect(reader: JoinHandle<Vec<u8>>) -> String {
    let bytes = reader.join().unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Kill and reap. Pipe readers are left to finish on their own: a
/// grandchild may still hold the pipes open.
fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
