//! Deploy Event Port
//!
//! Provides an observable interface for deploy runs.
//! Enables progress reporting, JSON event streams, and debugging.

use std::path::PathBuf;

/// Event emitted during a deploy run
#[derive(Debug, Clone, PartialEq)]
pub enum DeployEvent {
    /// Remote session established
    SessionOpened { destination: String },

    /// Ledger fetched from the remote store
    LedgerFetched {
        revisions: usize,
        active: Option<String>,
    },

    /// Ledger content was malformed and replaced by an empty ledger
    LedgerRecovered { reason: String },

    /// Release directory ensured on the remote host
    ReleaseDirReady { dir: String },

    /// File transfer batch started
    UploadStarted { total: usize },

    /// File transferred successfully
    FileUploaded { index: usize, path: PathBuf },

    /// File transfer failed (the batch stops here)
    UploadFailed {
        index: usize,
        path: PathBuf,
        error: String,
    },

    /// Release directories removed by pruning
    ReleasesPurged { dirs: Vec<String> },

    /// Ledger entry skipped during pruning because its id is not a safe directory name
    PruneSkipped { revision: String, reason: String },

    /// Ledger persisted to the remote store
    LedgerSaved { revisions: usize },

    /// Current pointer now targets this revision
    Activated { revision: String },

    /// Remote session closed
    SessionClosed,
}

/// Trait for receiving deploy events
///
/// Implementations can be:
/// - ConsoleEventSink: Progress display in terminal
/// - JsonEventSink: NDJSON event stream for CI
/// - NoopEventSink: Silent operation
pub trait DeployEventSink: Send + Sync {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);

    /// Check if this sink wants per-file events
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
