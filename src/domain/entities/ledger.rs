//! RevisionLedger entity - the release history of one deployment root
//!
//! Every operation returns a new ledger; nothing mutates in place. The
//! ledger is a pure data structure: fetching and persisting it is handled
//! by the application layer's ledger store.

use std::collections::HashMap;

use thiserror::Error;

use super::revision::{Revision, RevisionRecord};

/// Persisted ledger content is not well-formed
///
/// Recoverable: callers substitute an empty ledger and keep going.
#[derive(Debug, Error)]
pub enum LedgerParseError {
    #[error("ledger is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("ledger must be a JSON array, found {found}")]
    NotAnArray { found: &'static str },
}

/// Ordered, id-unique release history
///
/// Invariants, established by `normalize` and preserved by every operation:
/// - no two entries share an id
/// - entries are sorted ascending by timestamp (stable for ties)
/// - at most one entry is active
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionLedger {
    revisions: Vec<Revision>,
}

impl RevisionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse persisted ledger bytes.
    ///
    /// Empty input means "no ledger yet" and is not an error. Array elements
    /// that are not records, or whose fields have the wrong type, are
    /// discarded like records without an id.
    pub fn parse(raw: &[u8]) -> Result<Self, LedgerParseError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::new());
        }

        let value: serde_json::Value = serde_json::from_slice(raw)?;
        let serde_json::Value::Array(items) = value else {
            return Err(LedgerParseError::NotAnArray {
                found: json_kind(&value),
            });
        };

        let records = items.into_iter().filter_map(|item| {
            serde_json::from_value::<RevisionRecord>(item)
                .map_err(|e| tracing::debug!("discarding ledger record: {e}"))
                .ok()
        });

        Ok(Self::normalize(records))
    }

    /// Parse persisted ledger bytes, falling back to an empty ledger.
    ///
    /// The parse error, if any, is handed back so the caller can report it.
    pub fn load(raw: &[u8]) -> (Self, Option<LedgerParseError>) {
        match Self::parse(raw) {
            Ok(ledger) => (ledger, None),
            Err(err) => (Self::new(), Some(err)),
        }
    }

    /// Build a ledger from raw records.
    ///
    /// Drops records without an id, keeps the last record for a repeated id,
    /// sorts ascending by timestamp (stable), and keeps only the most recent
    /// active flag. Idempotent.
    pub fn normalize<I>(records: I) -> Self
    where
        I: IntoIterator<Item = RevisionRecord>,
    {
        let candidates: Vec<Revision> = records
            .into_iter()
            .filter_map(RevisionRecord::into_revision)
            .collect();

        let keep: Vec<bool> = {
            let mut last_index: HashMap<&str, usize> = HashMap::new();
            for (i, rev) in candidates.iter().enumerate() {
                last_index.insert(rev.id(), i);
            }
            candidates
                .iter()
                .enumerate()
                .map(|(i, rev)| last_index.get(rev.id()) == Some(&i))
                .collect()
        };

        let mut revisions: Vec<Revision> = candidates
            .into_iter()
            .zip(keep)
            .filter_map(|(rev, keep)| keep.then_some(rev))
            .collect();
        revisions.sort_by_key(Revision::timestamp);

        if let Some(live) = revisions.iter().rposition(Revision::is_active) {
            for (i, rev) in revisions.iter_mut().enumerate() {
                if i != live {
                    rev.set_active(false);
                }
            }
        }

        Self { revisions }
    }

    /// Insert `revision`, replacing any entry with the same id.
    ///
    /// Last write wins: the result holds exactly `revision` for its id. An
    /// active `revision` takes the active flag from every other entry.
    pub fn merge(&self, revision: Revision) -> Self {
        let mut records: Vec<RevisionRecord> = self
            .revisions
            .iter()
            .filter(|r| r.id() != revision.id())
            .cloned()
            .map(|mut r| {
                if revision.is_active() {
                    r.set_active(false);
                }
                RevisionRecord::from(r)
            })
            .collect();
        records.push(revision.into());
        Self::normalize(records)
    }

    /// Mark `id` active and every other entry inactive.
    ///
    /// An unknown id leaves no entry active.
    pub fn set_active(&self, id: &str) -> Self {
        let revisions = self
            .revisions
            .iter()
            .cloned()
            .map(|r| {
                let active = r.id() == id;
                r.with_active(active)
            })
            .collect();
        Self { revisions }
    }

    /// Keep only the given revisions (by id), preserving ledger order.
    pub fn retain_ids<'a, I>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let wanted: std::collections::HashSet<&str> = ids.into_iter().collect();
        let revisions = self
            .revisions
            .iter()
            .filter(|r| wanted.contains(r.id()))
            .cloned()
            .collect();
        Self { revisions }
    }

    /// Serialize to the persisted JSON array form
    pub fn serialize(&self) -> String {
        let records = self.records();
        // A Vec of plain structs with string/int/bool fields cannot fail to serialize.
        serde_json::to_string(&records).unwrap_or_else(|_| "[]".to_string())
    }

    /// Persisted records, in ledger order
    pub fn records(&self) -> Vec<RevisionRecord> {
        self.revisions.iter().cloned().map(Into::into).collect()
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Revision> {
        self.revisions.iter()
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Revision> {
        self.revisions.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The active entry, if any
    pub fn active(&self) -> Option<&Revision> {
        self.revisions.iter().find(|r| r.is_active())
    }
}

impl FromIterator<Revision> for RevisionLedger {
    fn from_iter<T: IntoIterator<Item = Revision>>(iter: T) -> Self {
        Self::normalize(iter.into_iter().map(RevisionRecord::from))
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests;
