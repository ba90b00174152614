//! Property tests for ledger normalization and merge.

use std::collections::HashSet;

use proptest::prelude::*;

use slipway::domain::entities::{Revision, RevisionLedger, RevisionRecord};

fn record() -> impl Strategy<Value = RevisionRecord> {
    // A small id alphabet makes duplicate ids common.
    (
        proptest::option::weighted(0.9, "[a-e]{1,2}"),
        0i64..50,
        any::<bool>(),
    )
        .prop_map(|(id, timestamp, active)| {
            let record = match id {
                Some(id) => RevisionRecord::new(id, timestamp),
                None => RevisionRecord::anonymous(timestamp),
            };
            record.with_active(active)
        })
}

fn assert_invariants(ledger: &RevisionLedger) -> Result<(), TestCaseError> {
    let ids: HashSet<&str> = ledger.iter().map(Revision::id).collect();
    prop_assert_eq!(ids.len(), ledger.len(), "ids must be unique");

    let timestamps: Vec<i64> = ledger.iter().map(Revision::timestamp).collect();
    prop_assert!(timestamps.windows(2).all(|w| w[0] <= w[1]), "must be sorted");

    prop_assert!(ledger.iter().filter(|r| r.is_active()).count() <= 1);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Normalizing an already normalized ledger changes nothing.
    #[test]
    fn property_normalize_is_idempotent(
        records in proptest::collection::vec(record(), 0..=12),
    ) {
        let once = RevisionLedger::normalize(records);
        let twice = RevisionLedger::normalize(once.records());

        assert_invariants(&once)?;
        prop_assert_eq!(once, twice);
    }

    /// PROPERTY: Merge holds exactly the merged revision for its id.
    #[test]
    fn property_merge_keeps_ids_unique(
        records in proptest::collection::vec(record(), 0..=12),
        id in "[a-f]{1,2}",
        timestamp in 0i64..60,
        active in any::<bool>(),
    ) {
        let ledger = RevisionLedger::normalize(records);
        let revision = Revision::new(id.clone(), timestamp).with_active(active);

        let merged = ledger.merge(revision.clone());

        assert_invariants(&merged)?;
        prop_assert_eq!(merged.iter().filter(|r| r.id() == id).count(), 1);
        prop_assert_eq!(merged.get(&id), Some(&revision));
        if active {
            prop_assert_eq!(merged.active().map(Revision::id), Some(id.as_str()));
        }
    }

    /// PROPERTY: Parsing serialized output gives back the same ledger.
    #[test]
    fn property_serialized_ledger_parses_back(
        records in proptest::collection::vec(record(), 0..=12),
    ) {
        let ledger = RevisionLedger::normalize(records);
        let parsed = RevisionLedger::parse(ledger.serialize().as_bytes()).unwrap();

        prop_assert_eq!(parsed, ledger);
    }
}
