//! Configuration module for Slipway
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (SLIPWAY_*)
//! 3. Config file (`--config`, `SLIPWAY_CONFIG`, or `./slipway.toml`)
//! 4. Built-in defaults (lowest priority)
//!
//! `Config::resolve` turns the layered result into an immutable
//! `DeploySettings` with every derived path computed up front.

mod loader;
mod types;

pub use loader::{parse_with_warnings, ConfigWarning, CONFIG_FILE};
pub use types::{Config, ConnectionConfig, DeployConfig, DeploySettings, Transport};
