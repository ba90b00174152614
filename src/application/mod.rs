//! Application Layer
//!
//! Use cases that sequence the domain against the remote host.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Talks to the host only through `RemoteExecutor`
//!
//! ## Use Cases
//!
//! - `DeployOrchestrator` - list, deploy and activate runs
//!
//! ## Steps
//!
//! - `LedgerStore` - fetch and persist the revision ledger
//! - `ReleaseUploader` - create the release directory and transfer files
//! - `ActivationController` - flip the current pointer and reconcile the ledger

pub mod activation;
pub mod commands;
pub mod deploy;
pub mod ledger_store;
pub mod remote;
pub mod upload;

pub use activation::{ActivationController, ActivationState};
pub use deploy::{DeployOptions, DeployOrchestrator, DeployReport};
pub use ledger_store::LedgerStore;
pub use remote::RemoteContext;
pub use upload::ReleaseUploader;
