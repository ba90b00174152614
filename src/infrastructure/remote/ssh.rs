//! SSH transport using the system OpenSSH client
//!
//! `connect` starts one master connection (`ssh -M -N`) bound to a control
//! socket in a private temporary directory. Every command and transfer of
//! the session is multiplexed over that socket, so authentication happens
//! once per run. Files are streamed through `cat >` on the remote side.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use crate::domain::ports::{CommandOutput, RemoteConnector, RemoteError, RemoteExecutor};

use super::process::{self, RunLimits};

const SOCKET_POLL: Duration = Duration::from_millis(50);
/// Extra time allowed on top of `ConnectTimeout` for authentication
const AUTH_GRACE: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct SshConnector {
    host: String,
    user: Option<String>,
    port: u16,
    identity_file: Option<PathBuf>,
    connect_timeout: Duration,
    options: Vec<String>,
    limits: RunLimits,
}

impl SshConnector {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: None,
            port: 22,
            identity_file: None,
            connect_timeout: Duration::from_secs(10),
            options: Vec::new(),
            limits: RunLimits::default(),
        }
    }

    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_identity_file(mut self, identity_file: Option<PathBuf>) -> Self {
        self.identity_file = identity_file;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Extra `-o` options, e.g. `StrictHostKeyChecking=accept-new`
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn with_limits(mut self, limits: RunLimits) -> Self {
        self.limits = limits;
        self
    }

    /// `user@host` or `host`
    fn target(&self) -> String {
        match &self.user {
            Some(user) => format!("{user}@{}", self.host),
            None => self.host.clone(),
        }
    }

    /// Options shared by the master and every multiplexed call
    fn common_args(&self, socket: &Path) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            socket.display().to_string(),
            "-p".to_string(),
            self.port.to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            // Keeps banners and host-key notices off stderr
            "-o".to_string(),
            "LogLevel=ERROR".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)),
        ];
        if let Some(identity) = &self.identity_file {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }
        for option in &self.options {
            args.push("-o".to_string());
            args.push(option.clone());
        }
        args
    }

    fn master_args(&self, socket: &Path) -> Vec<String> {
        let mut args = vec!["-M".to_string(), "-N".to_string()];
        args.extend(self.common_args(socket));
        args.push(self.target());
        args
    }

    fn wait_for_socket(
        &self,
        master: &mut Child,
        socket: &Path,
        log: &Path,
    ) -> Result<(), RemoteError> {
        let deadline = self.connect_timeout + AUTH_GRACE;
        let started = Instant::now();

        loop {
            if socket.exists() {
                return Ok(());
            }
            if let Some(status) = master.try_wait()? {
                let message = fs::read_to_string(log).unwrap_or_default();
                let message = message.trim();
                return Err(RemoteError::Connect(if message.is_empty() {
                    format!("ssh exited with {status}")
                } else {
                    message.to_string()
                }));
            }
            if self.limits.cancel.is_cancelled() {
                return Err(RemoteError::Cancelled);
            }
            if started.elapsed() >= deadline {
                return Err(RemoteError::Connect(format!(
                    "no connection after {}s",
                    deadline.as_secs()
                )));
            }
            thread::sleep(SOCKET_POLL);
        }
    }
}

impl RemoteConnector for SshConnector {
    type Session = SshSession;

    fn destination(&self) -> String {
        format!("{}:{}", self.target(), self.port)
    }

    fn connect(&self) -> Result<SshSession, RemoteError> {
        let dir = tempfile::Builder::new().prefix("slipway-").tempdir()?;
        let socket = dir.path().join("ctl");
        let log = dir.path().join("master.log");

        tracing::debug!(destination = %self.destination(), "starting ssh master");
        let mut master = Command::new("ssh")
            .args(self.master_args(&socket))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(File::create(&log)?))
            .spawn()?;

        if let Err(err) = self.wait_for_socket(&mut master, &socket, &log) {
            let _ = master.kill();
            let _ = master.wait();
            return Err(err);
        }

        Ok(SshSession {
            connector: self.clone(),
            socket,
            master: Some(master),
            _dir: dir,
        })
    }
}

/// Established SSH session; the master process dies with it
pub struct SshSession {
    connector: SshConnector,
    socket: PathBuf,
    master: Option<Child>,
    _dir: TempDir,
}

impl SshSession {
    fn command_args(&self, command: &str) -> Vec<String> {
        let mut args = self.connector.common_args(&self.socket);
        args.push(self.connector.target());
        args.push("--".to_string());
        args.push(command.to_string());
        args
    }

    fn ssh(&self, command: &str, stdin: Option<File>) -> Result<CommandOutput, RemoteError> {
        let mut ssh = Command::new("ssh");
        ssh.args(self.command_args(command));
        Ok(process::run(ssh, stdin, &self.connector.limits)?.into_command_output())
    }

    fn shutdown(&mut self) {
        let Some(mut master) = self.master.take() else {
            return;
        };
        let mut exit = Command::new("ssh");
        exit.args(self.connector.common_args(&self.socket))
            .args(["-O", "exit"])
            .arg(self.connector.target());
        let limits = RunLimits::new(Some(Duration::from_secs(5)), Default::default());
        if let Err(err) = process::run(exit, None, &limits) {
            tracing::debug!("ssh -O exit failed: {err}");
        }
        let _ = master.kill();
        let _ = master.wait();
    }
}

impl RemoteExecutor for SshSession {
    fn run_command(&mut self, command: &str) -> Result<CommandOutput, RemoteError> {
        self.ssh(command, None)
    }

    fn put_file(&mut self, local: &Path, remote: &str) -> Result<(), RemoteError> {
        let file = File::open(local)?;
        let command = format!("cat > '{}'", remote.replace('\'', "'\\''"));
        let output = self.ssh(&command, Some(file))?;
        if output.is_success() {
            Ok(())
        } else {
            Err(RemoteError::Transport(output.stderr.trim_end().to_string()))
        }
    }

    fn close(mut self) -> Result<(), RemoteError> {
        self.shutdown();
        Ok(())
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
