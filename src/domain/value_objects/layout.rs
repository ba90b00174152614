//! Remote layout value object
//!
//! Every remote path Slipway touches is derived here, once, from the
//! deployment root:
//!
//! ```text
//! <root>/releases/<revision-id>/...
//! <root>/releases/revisions.json
//! <root>/current -> <root>/releases/<active-revision-id>
//! ```
//!
//! Remote paths are POSIX strings regardless of the local platform.

use std::path::Path;

use thiserror::Error;

pub const RELEASES_DIR: &str = "releases";
pub const LEDGER_FILE: &str = "revisions.json";
pub const CURRENT_LINK: &str = "current";
/// Staging name the ledger is written under before the rename
pub const LEDGER_TMP_FILE: &str = "revisions.json.tmp";

/// Revision id that cannot name a release directory
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid revision id '{revision}': {reason}")]
pub struct RevisionIdError {
    pub revision: String,
    pub reason: &'static str,
}

/// Check that a revision id is a single, plain path segment.
pub fn validate_revision_id(id: &str) -> Result<(), RevisionIdError> {
    let reason = if id.is_empty() {
        Some("id is empty")
    } else if id == "." || id == ".." {
        Some("id is a relative path component")
    } else if id.contains('/') || id.contains('\\') {
        Some("id contains a path separator")
    } else if id.contains('\0') {
        Some("id contains a NUL byte")
    } else if id == LEDGER_FILE || id == LEDGER_TMP_FILE {
        Some("id is reserved for the revision ledger")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(RevisionIdError {
            revision: id.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Fully resolved remote paths for one deployment root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLayout {
    root: String,
    releases_dir: String,
    ledger_path: String,
    ledger_tmp_path: String,
    current_link: String,
}

impl RemoteLayout {
    /// Derive the layout from a deployment root such as `/var/www`
    pub fn new(root: impl AsRef<str>) -> Self {
        let root = normalize_root(root.as_ref());
        let releases_dir = join(&root, RELEASES_DIR);
        Self {
            ledger_path: join(&releases_dir, LEDGER_FILE),
            ledger_tmp_path: join(&releases_dir, LEDGER_TMP_FILE),
            current_link: join(&root, CURRENT_LINK),
            releases_dir,
            root,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn releases_dir(&self) -> &str {
        &self.releases_dir
    }

    pub fn ledger_path(&self) -> &str {
        &self.ledger_path
    }

    pub fn ledger_tmp_path(&self) -> &str {
        &self.ledger_tmp_path
    }

    pub fn current_link(&self) -> &str {
        &self.current_link
    }

    /// Release directory for `id`, refusing ids that would escape `releases/`
    pub fn release_dir(&self, id: &str) -> Result<String, RevisionIdError> {
        validate_revision_id(id)?;
        Ok(join(&self.releases_dir, id))
    }

    /// Remote location of an artifact file relative to `dir`
    pub fn remote_file(dir: &str, relative: &Path) -> String {
        let relative = relative.to_string_lossy().replace('\\', "/");
        join(dir, relative.trim_start_matches('/'))
    }
}

fn normalize_root(root: &str) -> String {
    let trimmed = root.trim_end_matches('/');
    if trimmed.is_empty() && root.starts_with('/') {
        "/".to_string()
    } else if trimmed.is_empty() {
        ".".to_string()
    } else {
        trimmed.to_string()
    }
}

fn join(base: &str, segment: &str) -> String {
    if base == "/" {
        format!("/{segment}")
    } else {
        format!("{base}/{segment}")
    }
}
