//! Artifact file value object

use std::path::{Path, PathBuf};

/// One file of the local build output
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArtifactFile {
    /// Path relative to the artifact directory; also the path inside the release
    relative: PathBuf,
    /// Absolute or working-directory-relative local path
    local: PathBuf,
}

impl ArtifactFile {
    pub fn new(local: impl Into<PathBuf>, relative: impl Into<PathBuf>) -> Self {
        Self {
            relative: relative.into(),
            local: local.into(),
        }
    }

    /// Artifact located at `root/relative`
    pub fn under(root: &Path, relative: impl Into<PathBuf>) -> Self {
        let relative = relative.into();
        Self::new(root.join(&relative), relative)
    }

    pub fn local(&self) -> &Path {
        &self.local
    }

    pub fn relative(&self) -> &Path {
        &self.relative
    }
}
