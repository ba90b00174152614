//! Deploy Options

use crate::domain::value_objects::ArtifactFile;

/// Default number of releases kept besides the active one
pub const DEFAULT_KEEP: usize = 2;

/// Options for one deploy run
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Artifact set, in upload order
    pub files: Vec<ArtifactFile>,
    /// Revision id; `None` uploads untracked into the deployment root
    pub revision: Option<String>,
    /// Number of most recent releases to retain when pruning
    pub keep: usize,
    /// Activate the uploaded revision in the same session
    pub activate: bool,
}

impl DeployOptions {
    pub fn new(files: Vec<ArtifactFile>) -> Self {
        Self {
            files,
            revision: None,
            keep: DEFAULT_KEEP,
            activate: false,
        }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn with_keep(mut self, keep: usize) -> Self {
        self.keep = keep;
        self
    }

    pub fn with_activate(mut self, activate: bool) -> Self {
        self.activate = activate;
        self
    }

    pub fn is_tracked(&self) -> bool {
        self.revision.is_some()
    }
}
