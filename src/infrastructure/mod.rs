//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `remote/` - Transports (SSH, local, scripted)
//! - `events/` - Event sinks (console, JSON)
//! - `artifacts` - Local artifact collection

pub mod artifacts;
pub mod events;
pub mod remote;

// Re-export for convenience
pub use events::{ConsoleEventSink, JsonEventSink};
pub use remote::{LocalConnector, RunLimits, ScriptedConnector, SshConnector};
