//! Domain Layer
//!
//! Release bookkeeping without I/O: the revision ledger, the prune rule and
//! the remote directory layout.
//!
//! ## Structure
//!
//! - `entities/` - Revision and RevisionLedger
//! - `value_objects/` - RemoteLayout, IgnorePatterns, CancellationToken
//! - `services/` - PruneEngine
//! - `ports/` - RemoteConnector/RemoteExecutor and DeployEventSink
//!
//! Everything that touches a host goes through a port.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
