//! Revision entity - one deployed artifact set

use serde::{Deserialize, Deserializer, Serialize};

/// A release known to the ledger
///
/// Always carries an id: id-less records never make it past
/// `RevisionLedger::normalize`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision {
    id: String,
    /// Milliseconds since the Unix epoch
    timestamp: i64,
    active: bool,
}

impl Revision {
    /// Create an inactive revision
    pub fn new(id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            timestamp,
            active: false,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

impl From<Revision> for RevisionRecord {
    fn from(revision: Revision) -> Self {
        Self {
            revision: Some(revision.id),
            timestamp: revision.timestamp,
            active: revision.active,
        }
    }
}

/// Persisted form of a ledger entry
///
/// Mirrors one element of `revisions.json`. `revision` is optional here
/// because stored data may lack it; such records are discarded on
/// normalization. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, deserialize_with = "epoch_millis")]
    pub timestamp: i64,
    #[serde(default)]
    pub active: bool,
}

impl RevisionRecord {
    pub fn new(revision: impl Into<String>, timestamp: i64) -> Self {
        Self {
            revision: Some(revision.into()),
            timestamp,
            active: false,
        }
    }

    /// A record with no usable id
    pub fn anonymous(timestamp: i64) -> Self {
        Self {
            revision: None,
            timestamp,
            active: false,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Materialize into a `Revision`, or `None` when the id is missing or empty
    pub fn into_revision(self) -> Option<Revision> {
        let id = self.revision.filter(|id| !id.is_empty())?;
        Some(Revision::new(id, self.timestamp).with_active(self.active))
    }
}

/// Timestamps written by other tools may be floats (`1.7e12`); truncate them.
fn epoch_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    number
        .as_i64()
        .or_else(|| number.as_f64().map(|f| f as i64))
        .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {number}")))
}
