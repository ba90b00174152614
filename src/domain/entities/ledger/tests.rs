use super::*;

const T: i64 = 1_700_000_000_000;

fn ids(ledger: &RevisionLedger) -> Vec<&str> {
    ledger.iter().map(Revision::id).collect()
}

// === Parsing ===

#[test]
fn parse_sorts_and_discards_records_without_revision() {
    let raw = format!(
        r#"[
            {{"revision":"1","timestamp":{}}},
            {{"revision":"2","timestamp":{}}},
            {{"revision":"3","timestamp":{}}},
            {{"trash":"LOL"}}
        ]"#,
        T - 50_000,
        T - 100_000,
        T
    );

    let ledger = RevisionLedger::parse(raw.as_bytes()).unwrap();

    assert_eq!(ids(&ledger), vec!["2", "1", "3"]);
}

#[test]
fn parse_empty_input_is_empty_ledger() {
    assert!(RevisionLedger::parse(b"").unwrap().is_empty());
    assert!(RevisionLedger::parse(b"  \n").unwrap().is_empty());
}

#[test]
fn parse_rejects_non_array() {
    let err = RevisionLedger::parse(br#"{"revision":"1"}"#).unwrap_err();
    assert!(matches!(err, LedgerParseError::NotAnArray { found: "an object" }));
}

#[test]
fn parse_discards_elements_with_wrong_types() {
    let raw = br#"[{"revision":1,"timestamp":5},"junk",{"revision":"ok","timestamp":"x"},{"revision":"good","timestamp":9}]"#;
    let ledger = RevisionLedger::parse(raw).unwrap();
    assert_eq!(ids(&ledger), vec!["good"]);
}

#[test]
fn load_recovers_from_garbage_with_empty_ledger() {
    let (ledger, err) = RevisionLedger::load(b"{not json");
    assert!(ledger.is_empty());
    assert!(matches!(err, Some(LedgerParseError::Malformed(_))));
}

#[test]
fn load_reports_no_error_for_valid_content() {
    let (ledger, err) = RevisionLedger::load(br#"[{"revision":"a","timestamp":1,"active":true}]"#);
    assert!(err.is_none());
    assert_eq!(ledger.active().map(Revision::id), Some("a"));
}

// === Normalization ===

#[test]
fn normalize_is_idempotent() {
    let records = vec![
        RevisionRecord::new("b", 20),
        RevisionRecord::anonymous(5),
        RevisionRecord::new("a", 10).with_active(true),
        RevisionRecord::new("b", 30),
    ];

    let once = RevisionLedger::normalize(records);
    let twice = RevisionLedger::normalize(once.records());

    assert_eq!(once, twice);
}

#[test]
fn normalize_keeps_last_record_for_repeated_id() {
    let ledger = RevisionLedger::normalize(vec![
        RevisionRecord::new("a", 10),
        RevisionRecord::new("b", 20),
        RevisionRecord::new("a", 30),
    ]);

    assert_eq!(ids(&ledger), vec!["b", "a"]);
    assert_eq!(ledger.get("a").unwrap().timestamp(), 30);
}

#[test]
fn normalize_is_stable_for_equal_timestamps() {
    let ledger = RevisionLedger::normalize(vec![
        RevisionRecord::new("z", 10),
        RevisionRecord::new("a", 10),
        RevisionRecord::new("m", 5),
    ]);

    assert_eq!(ids(&ledger), vec!["m", "z", "a"]);
}

#[test]
fn normalize_keeps_only_most_recent_active() {
    let ledger = RevisionLedger::normalize(vec![
        RevisionRecord::new("new", 30).with_active(true),
        RevisionRecord::new("old", 10).with_active(true),
    ]);

    assert_eq!(ledger.active().map(Revision::id), Some("new"));
    assert!(!ledger.get("old").unwrap().is_active());
}

// === Merge ===

#[test]
fn merge_appends_new_revision() {
    let ledger: RevisionLedger = vec![Revision::new("1", T - 10)].into_iter().collect();

    let merged = ledger.merge(Revision::new("2", T));

    assert_eq!(ids(&merged), vec!["1", "2"]);
    // Original untouched
    assert_eq!(ledger.len(), 1);
}

#[test]
fn merge_replaces_existing_id() {
    let ledger: RevisionLedger = vec![
        Revision::new("1", T - 10).with_active(true),
        Revision::new("2", T - 5),
    ]
    .into_iter()
    .collect();

    let merged = ledger.merge(Revision::new("1", T));

    assert_eq!(ids(&merged), vec!["2", "1"]);
    assert_eq!(merged.get("1"), Some(&Revision::new("1", T)));
    assert_eq!(merged.active(), None);
}

#[test]
fn merge_inactive_keeps_existing_active() {
    let ledger: RevisionLedger = vec![Revision::new("live", T - 10).with_active(true)]
        .into_iter()
        .collect();

    let merged = ledger.merge(Revision::new("next", T));

    assert_eq!(merged.active().map(Revision::id), Some("live"));
}

#[test]
fn merge_active_revision_takes_the_flag() {
    let ledger: RevisionLedger = vec![Revision::new("live", T).with_active(true)]
        .into_iter()
        .collect();

    let merged = ledger.merge(Revision::new("older", T - 100).with_active(true));

    assert_eq!(merged.active().map(Revision::id), Some("older"));
    assert!(!merged.get("live").unwrap().is_active());
}

// === Active flag ===

#[test]
fn set_active_flips_exactly_one() {
    let ledger: RevisionLedger = vec![
        Revision::new("LOL", T - 50_000).with_active(true),
        Revision::new("12345", T),
    ]
    .into_iter()
    .collect();

    let flipped = ledger.set_active("12345");

    assert!(!flipped.get("LOL").unwrap().is_active());
    assert!(flipped.get("12345").unwrap().is_active());
}

#[test]
fn set_active_unknown_id_clears_all() {
    let ledger: RevisionLedger = vec![Revision::new("a", 1).with_active(true)]
        .into_iter()
        .collect();

    assert_eq!(ledger.set_active("missing").active(), None);
}

#[test]
fn retain_ids_preserves_order() {
    let ledger: RevisionLedger = vec![
        Revision::new("a", 1),
        Revision::new("b", 2),
        Revision::new("c", 3),
    ]
    .into_iter()
    .collect();

    let kept = ledger.retain_ids(["c", "a"]);

    assert_eq!(ids(&kept), vec!["a", "c"]);
}

// === Serialization ===

#[test]
fn serialize_uses_persisted_field_names() {
    let ledger: RevisionLedger = vec![
        Revision::new("LOL", 100),
        Revision::new("12345", 200).with_active(true),
    ]
    .into_iter()
    .collect();

    assert_eq!(
        ledger.serialize(),
        r#"[{"revision":"LOL","timestamp":100,"active":false},{"revision":"12345","timestamp":200,"active":true}]"#
    );
}

#[test]
fn serialize_then_parse_preserves_ledger() {
    let ledger: RevisionLedger = vec![
        Revision::new("a", 1),
        Revision::new("b", 2).with_active(true),
    ]
    .into_iter()
    .collect();

    let reparsed = RevisionLedger::parse(ledger.serialize().as_bytes()).unwrap();

    assert_eq!(reparsed, ledger);
}
