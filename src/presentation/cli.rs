//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! Global flags (--config, --json, --verbose, --host, --dir) are inherited by
//! all subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

/// Slipway - versioned release deployer
#[derive(Parser, Debug)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to ./slipway.toml)
    #[arg(long, global = true, env = "SLIPWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output NDJSON events for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Deployment host (overrides connection.host)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Deployment root on the host (overrides deploy.dir)
    #[arg(long, global = true)]
    pub dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List revisions on the host
    List,

    /// Upload the artifact directory as a new release
    Deploy {
        /// Revision id (omit to upload untracked into the deployment root)
        #[arg(long, conflicts_with = "git_revision")]
        revision: Option<String>,

        /// Use `git rev-parse --short HEAD` as the revision id
        #[arg(long)]
        git_revision: bool,

        /// Artifact directory (overrides deploy.dist_dir)
        #[arg(long)]
        dist: Option<PathBuf>,

        /// Releases to keep besides the active one (overrides deploy.keep)
        #[arg(long)]
        keep: Option<usize>,

        /// Activate the revision once uploaded
        #[arg(long)]
        activate: bool,
    },

    /// Point `current` at an uploaded revision
    Activate {
        /// Revision id to activate
        revision: String,
    },
}

impl Cli {
    /// Apply command line overrides on top of file and environment config
    pub fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(host) = &self.host {
            config.connection.host = Some(host.clone());
        }
        if let Some(dir) = &self.dir {
            config.deploy.dir = dir.clone();
        }
        if let Commands::Deploy { dist, keep, .. } = &self.command {
            if let Some(dist) = dist {
                config.deploy.dist_dir = dist.clone();
            }
            if let Some(keep) = keep {
                config.deploy.keep = *keep;
            }
        }
        config
    }
}
