//! Prune planning service
//!
//! Pure domain logic deciding which releases to delete. No I/O: the
//! application layer removes the directories and persists the kept ledger.

use crate::domain::entities::{Revision, RevisionLedger};

/// Outcome of a prune decision
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrunePlan {
    /// Releases outside the retention window, oldest first
    pub to_delete: Vec<Revision>,
    /// Releases to keep, in ledger order
    pub to_keep: Vec<Revision>,
}

impl PrunePlan {
    /// Check if nothing needs deleting
    pub fn is_noop(&self) -> bool {
        self.to_delete.is_empty()
    }

    /// The ledger that remains after pruning
    pub fn kept_ledger(&self) -> RevisionLedger {
        self.to_keep.iter().cloned().collect()
    }
}

/// Retention policy: keep the newest `keep` releases plus the active one
pub struct PruneEngine;

impl PruneEngine {
    /// Split the ledger into releases to delete and releases to keep.
    ///
    /// Walks the ledger in ascending timestamp order. An entry is kept when it
    /// is among the last `keep` entries or when it is active, so an older,
    /// deliberately pinned release survives any retention count. With
    /// `keep == 0` only the active release survives.
    pub fn split(ledger: &RevisionLedger, keep: usize) -> PrunePlan {
        let offset = ledger.len().saturating_sub(keep);

        let (to_keep, to_delete): (Vec<Revision>, Vec<Revision>) = ledger
            .iter()
            .enumerate()
            .map(|(i, rev)| (i >= offset || rev.is_active(), rev.clone()))
            .fold((Vec::new(), Vec::new()), |(mut keep, mut delete), (kept, rev)| {
                if kept {
                    keep.push(rev);
                } else {
                    delete.push(rev);
                }
                (keep, delete)
            });

        PrunePlan { to_delete, to_keep }
    }
}
