//! Test environment for isolated Slipway runs.
//!
//! `TestEnv` owns a temp project directory containing a `dist/` artifact
//! directory and a `slipway.toml` that targets `site/` through the local
//! transport, so every command runs end to end without a remote host.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Result of running a Slipway CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Non-empty stdout lines parsed as JSON
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad NDJSON {l:?}: {e}")))
            .collect()
    }
}

pub struct TestEnv {
    pub project_root: TempDir,
    slipway_bin: PathBuf,
}

impl TestEnv {
    /// Project with a local-transport config and an empty `dist/`
    pub fn new() -> Self {
        let project_root = tempfile::tempdir().unwrap();
        let site = project_root.path().join("site");
        fs::create_dir_all(project_root.path().join("dist")).unwrap();

        let config = format!(
            "[connection]\ntransport = \"local\"\n\n[deploy]\ndir = \"{}\"\nkeep = 2\n",
            site.display()
        );
        fs::write(project_root.path().join("slipway.toml"), config).unwrap();

        Self {
            project_root,
            slipway_bin: PathBuf::from(env!("CARGO_BIN_EXE_slipway")),
        }
    }

    /// Replace `slipway.toml` with `contents`
    pub fn write_config(&self, contents: &str) {
        fs::write(self.project_path("slipway.toml"), contents).unwrap();
    }

    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// Deployment root used by the local transport
    pub fn site_path(&self, relative: &str) -> PathBuf {
        self.project_path("site").join(relative)
    }

    /// Write an artifact under `dist/`
    pub fn write_artifact(&self, relative: &str, content: &str) {
        let path = self.project_path("dist").join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Release directory `current` points at, if any
    pub fn current_target(&self) -> Option<PathBuf> {
        fs::read_link(self.site_path("current")).ok()
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_from(self.project_root.path(), args)
    }

    pub fn run_from(&self, cwd: &Path, args: &[&str]) -> TestResult {
        let mut cmd = Command::new(&self.slipway_bin);
        cmd.current_dir(cwd).args(args).env("NO_COLOR", "1");
        for var in [
            "SLIPWAY_CONFIG",
            "SLIPWAY_TRANSPORT",
            "SLIPWAY_HOST",
            "SLIPWAY_USER",
            "SLIPWAY_PORT",
            "SLIPWAY_DIR",
            "SLIPWAY_KEEP",
            "SLIPWAY_LOG",
            "RUST_LOG",
        ] {
            cmd.env_remove(var);
        }

        let output = cmd.output().expect("failed to run slipway");
        TestResult {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}
