//! Remote transports
//!
//! Implementations of `RemoteConnector`/`RemoteExecutor`:
//! - `SshConnector` - OpenSSH client over a shared control socket
//! - `LocalConnector` - same-host shell and file copies
//! - `ScriptedConnector` - recording test double

mod local;
mod process;
mod scripted;
mod ssh;

pub use local::{LocalConnector, LocalSession};
pub use process::RunLimits;
pub use scripted::{ScriptedConnector, ScriptedSession};
pub use ssh::{SshConnector, SshSession};
