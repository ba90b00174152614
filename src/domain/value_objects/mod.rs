//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod artifact;
mod cancellation;
mod config_warning;
mod ignore_patterns;
mod layout;

pub use artifact::ArtifactFile;
pub use cancellation::CancellationToken;
pub use config_warning::ConfigWarning;
pub use ignore_patterns::{IgnoreError, IgnorePatterns, IGNORE_FILE};
pub use layout::{
    validate_revision_id, RemoteLayout, RevisionIdError, CURRENT_LINK, LEDGER_FILE, LEDGER_TMP_FILE,
    RELEASES_DIR,
};
