//! Domain Services
//!
//! Stateless services containing pure business logic.

mod prune;

pub use prune::{PruneEngine, PrunePlan};
