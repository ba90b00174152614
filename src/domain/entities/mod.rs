//! Domain Entities
//!
//! Core domain entities that have identity and lifecycle.
//! - `Revision` - One deployed artifact set
//! - `RevisionLedger` - Ordered release history of a deployment root

mod ledger;
mod revision;

pub use ledger::{LedgerParseError, RevisionLedger};
pub use revision::{Revision, RevisionRecord};
