//! Configuration type definitions

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::RemoteLayout;
use crate::error::{SlipwayError, SlipwayResult};

use super::loader::{self, ConfigWarning};

/// How commands reach the deployment host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Ssh,
    /// Deployment root on this machine
    Local,
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ssh" => Ok(Transport::Ssh),
            "local" => Ok(Transport::Local),
            other => Err(format!("unknown transport '{other}' (expected ssh or local)")),
        }
    }
}

/// `[connection]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub transport: Transport,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Private key path; `~` expands to the home directory
    #[serde(default)]
    pub identity_file: Option<String>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Extra `ssh -o` options
    #[serde(default)]
    pub ssh_options: Vec<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            host: None,
            user: None,
            port: default_port(),
            identity_file: None,
            connect_timeout_secs: default_connect_timeout(),
            ssh_options: Vec::new(),
        }
    }
}

fn default_port() -> u16 {
    22
}

fn default_connect_timeout() -> u64 {
    10
}

/// `[deploy]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Deployment root on the host
    #[serde(default = "default_dir")]
    pub dir: String,

    /// Releases kept besides the active one
    #[serde(default = "default_keep")]
    pub keep: usize,

    /// Local artifact directory
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,

    /// Gitignore-style patterns excluded from upload
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Deadline for each remote command; 0 waits forever
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            keep: default_keep(),
            dist_dir: default_dist_dir(),
            ignore: Vec::new(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

fn default_dir() -> String {
    "/var/www".to_string()
}

fn default_keep() -> usize {
    crate::application::deploy::DEFAULT_KEEP
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_command_timeout() -> u64 {
    300
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub deploy: DeployConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> SlipwayResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> SlipwayResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load the explicit config file, else `./slipway.toml`, else defaults
    pub fn discover(explicit: Option<&Path>) -> SlipwayResult<(Self, Vec<ConfigWarning>)> {
        loader::discover(explicit)
    }

    /// Apply environment variable overrides (SLIPWAY_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self, |name| std::env::var(name).ok())
    }

    /// Resolve into the settings a run uses, validating them.
    pub fn resolve(&self) -> SlipwayResult<DeploySettings> {
        let connection = &self.connection;
        let host = connection
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string);

        if connection.transport == Transport::Ssh {
            if host.is_none() {
                return Err(SlipwayError::Config(
                    "connection.host is required for the ssh transport".to_string(),
                ));
            }
            if !self.deploy.dir.starts_with('/') {
                return Err(SlipwayError::Config(format!(
                    "deploy.dir must be an absolute path, got '{}'",
                    self.deploy.dir
                )));
            }
        }
        if self.deploy.dir.trim().is_empty() {
            return Err(SlipwayError::Config("deploy.dir is empty".to_string()));
        }

        // Link targets resolve against the link's directory, so the local
        // root must not stay relative to the working directory.
        let root = match connection.transport {
            Transport::Ssh => self.deploy.dir.clone(),
            Transport::Local => absolute_under(&std::env::current_dir()?, &self.deploy.dir)?,
        };

        Ok(DeploySettings {
            transport: connection.transport,
            host,
            user: connection.user.clone().filter(|u| !u.is_empty()),
            port: connection.port,
            identity_file: connection.identity_file.as_deref().map(expand_home),
            connect_timeout: Duration::from_secs(connection.connect_timeout_secs),
            ssh_options: connection.ssh_options.clone(),
            layout: RemoteLayout::new(&root),
            keep: self.deploy.keep,
            dist_dir: self.deploy.dist_dir.clone(),
            ignore: self.deploy.ignore.clone(),
            command_timeout: match self.deploy.command_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        })
    }
}

/// Fully resolved, immutable settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct DeploySettings {
    pub transport: Transport,
    /// Always set for the ssh transport
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: u16,
    pub identity_file: Option<PathBuf>,
    pub connect_timeout: Duration,
    pub ssh_options: Vec<String>,
    pub layout: RemoteLayout,
    pub keep: usize,
    pub dist_dir: PathBuf,
    pub ignore: Vec<String>,
    /// `None` disables the per-command deadline
    pub command_timeout: Option<Duration>,
}

/// `dir` joined onto `base` unless already absolute, without `.` segments
fn absolute_under(base: &Path, dir: &str) -> SlipwayResult<String> {
    let path: PathBuf = base
        .join(expand_home(dir))
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    path.to_str().map(str::to_string).ok_or_else(|| {
        SlipwayError::Config(format!(
            "deploy.dir is not valid UTF-8: {}",
            path.display()
        ))
    })
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
