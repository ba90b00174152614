//! Property tests for the prune decision.

use proptest::prelude::*;

use slipway::domain::entities::{Revision, RevisionLedger};
use slipway::domain::services::PruneEngine;

fn ledger() -> impl Strategy<Value = RevisionLedger> {
    (1usize..=10, proptest::option::of(0usize..10)).prop_map(|(len, active)| {
        let ledger: RevisionLedger = (0..len)
            .map(|i| Revision::new(format!("r{i}"), 1_000 * i as i64))
            .collect();
        match active.filter(|&a| a < len) {
            Some(a) => ledger.set_active(&format!("r{a}")),
            None => ledger,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: The active release is never deleted.
    #[test]
    fn property_prune_retains_active(ledger in ledger(), keep in 0usize..12) {
        let plan = PruneEngine::split(&ledger, keep);

        prop_assert!(plan.to_delete.iter().all(|r| !r.is_active()));
        if let Some(active) = ledger.active() {
            prop_assert!(plan.to_keep.contains(active));
        }
    }

    /// PROPERTY: At most len - keep releases are deleted, and the partition is exact.
    #[test]
    fn property_prune_count_is_bounded(ledger in ledger(), keep in 0usize..12) {
        let plan = PruneEngine::split(&ledger, keep);

        prop_assert!(plan.to_delete.len() <= ledger.len().saturating_sub(keep));
        prop_assert_eq!(plan.to_delete.len() + plan.to_keep.len(), ledger.len());
        prop_assert!(plan.to_keep.len() >= keep.min(ledger.len()));
        if ledger.active().is_none() {
            prop_assert_eq!(plan.to_keep.len(), keep.min(ledger.len()));
        }
    }

    /// PROPERTY: Deleted releases are all older than every kept non-active release.
    #[test]
    fn property_prune_deletes_oldest(ledger in ledger(), keep in 0usize..12) {
        let plan = PruneEngine::split(&ledger, keep);

        let newest_deleted = plan.to_delete.iter().map(Revision::timestamp).max();
        let oldest_kept = plan
            .to_keep
            .iter()
            .filter(|r| !r.is_active())
            .map(Revision::timestamp)
            .min();
        if let (Some(deleted), Some(kept)) = (newest_deleted, oldest_kept) {
            prop_assert!(deleted < kept);
        }
    }
}
