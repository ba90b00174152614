//! Slipway - versioned release deployer
//!
//! Slipway uploads a build's artifact set into a per-revision release
//! directory on a remote host, keeps a small JSON ledger of deployed
//! revisions, prunes old releases, and switches the live `current` pointer
//! between them with a single atomic symlink replacement.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{DeployOptions, DeployOrchestrator, DeployReport};
pub use config::{Config, DeploySettings, Transport};
pub use domain::entities::{Revision, RevisionLedger};
pub use domain::ports::{DeployEvent, DeployEventSink, RemoteConnector, RemoteExecutor};
pub use domain::services::{PruneEngine, PrunePlan};
pub use domain::value_objects::{CancellationToken, RemoteLayout};
pub use error::{SlipwayError, SlipwayResult};
