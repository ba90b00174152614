//! Deploy Module
//!
//! Sequences a deploy run against one remote session.
//!
//! ## Structure
//!
//! - `options` - What to deploy (`DeployOptions`)
//! - `result` - What happened (`DeployReport`)
//! - `use_case` - The run itself (`DeployOrchestrator`)
//!
//! ## Usage
//!
//! ```ignore
//! use slipway::application::deploy::{DeployOptions, DeployOrchestrator};
//!
//! let orchestrator = DeployOrchestrator::new(connector, settings.layout.clone());
//! let report = orchestrator.deploy(&DeployOptions::new(files).with_revision("abc123"))?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::{DeployOptions, DEFAULT_KEEP};
pub use result::DeployReport;
pub use use_case::DeployOrchestrator;
