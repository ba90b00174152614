//! Deploy Report
//!
//! What a completed deploy run did on the remote host.

use std::path::PathBuf;

use crate::domain::entities::RevisionLedger;

#[derive(Debug, Clone, Default)]
pub struct DeployReport {
    /// Revision id, `None` for an untracked upload
    pub revision: Option<String>,
    /// Remote directory the files were uploaded to
    pub target_dir: String,
    /// Uploaded files, relative to the artifact directory
    pub uploaded: Vec<PathBuf>,
    /// Release directories removed by pruning
    pub purged: Vec<String>,
    /// Ledger entries dropped without touching the host (unsafe ids)
    pub skipped: Vec<String>,
    /// Revision activated by this run
    pub activated: Option<String>,
    /// Ledger as last persisted (empty for an untracked upload)
    pub ledger: RevisionLedger,
}

impl DeployReport {
    pub fn new(target_dir: impl Into<String>) -> Self {
        Self {
            target_dir: target_dir.into(),
            ..Self::default()
        }
    }

    pub fn has_pruned(&self) -> bool {
        !self.purged.is_empty() || !self.skipped.is_empty()
    }
}
