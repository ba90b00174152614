//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating connectors and orchestrators from resolved settings
//! - Output formatting (text/JSON)
//!
//! ## Structure
//!
//! - `cli` - Argument definitions and command line overrides
//! - `factory` - Wires infrastructure into the orchestrator (dependency injection)
//! - `output` - Revision list and deploy report rendering

pub mod cli;
pub mod factory;
pub mod output;

pub use cli::{Cli, Commands};
