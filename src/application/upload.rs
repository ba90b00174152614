//! Release uploader
//!
//! Creates the release directory and transfers the artifact set into it,
//! one file at a time, in input order. The first failed transfer stops the
//! batch: files before it are on the host, files after it were never sent.

use std::collections::BTreeSet;
use std::path::Path;

use crate::application::commands;
use crate::application::remote::RemoteContext;
use crate::domain::entities::Revision;
use crate::domain::ports::{DeployEvent, RemoteError, RemoteExecutor};
use crate::domain::value_objects::{ArtifactFile, RemoteLayout};
use crate::error::{SlipwayError, SlipwayResult};

pub struct ReleaseUploader<'a> {
    ctx: RemoteContext<'a>,
}

impl<'a> ReleaseUploader<'a> {
    pub fn new(ctx: RemoteContext<'a>) -> Self {
        Self { ctx }
    }

    /// Directory the artifact set lands in.
    ///
    /// A tracked upload goes to `releases/<id>`; an untracked one (no
    /// revision id) goes straight into the deployment root.
    pub fn target_dir(&self, revision: Option<&str>) -> SlipwayResult<String> {
        match revision {
            Some(id) => Ok(self.ctx.layout.release_dir(id)?),
            None => Ok(self.ctx.layout.root().to_string()),
        }
    }

    /// Ensure the target directory and every nested directory exist.
    ///
    /// Idempotent, so a failed deploy of the same revision can be re-run.
    pub fn prepare<S>(
        &self,
        session: &mut S,
        revision: Option<&str>,
        files: &[ArtifactFile],
    ) -> SlipwayResult<String>
    where
        S: RemoteExecutor + ?Sized,
    {
        let dir = self.target_dir(revision)?;

        let nested: BTreeSet<String> = files
            .iter()
            .filter_map(|f| f.relative().parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| RemoteLayout::remote_file(&dir, p))
            .collect();

        let dirs = std::iter::once(dir.as_str()).chain(nested.iter().map(String::as_str));
        self.ctx.run(session, &commands::ensure_dirs(dirs))?;

        self.ctx
            .emit(DeployEvent::ReleaseDirReady { dir: dir.clone() });
        Ok(dir)
    }

    /// Transfer `files` into `dir`, strictly in order.
    ///
    /// Returns the new ledger entry (inactive, stamped now) for a tracked
    /// upload, `None` for an untracked one.
    pub fn upload<S>(
        &self,
        session: &mut S,
        dir: &str,
        revision: Option<&str>,
        files: &[ArtifactFile],
    ) -> SlipwayResult<Option<Revision>>
    where
        S: RemoteExecutor + ?Sized,
    {
        self.ctx.emit(DeployEvent::UploadStarted { total: files.len() });

        for (index, file) in files.iter().enumerate() {
            self.ctx.check_cancelled()?;
            let remote = RemoteLayout::remote_file(dir, file.relative());
            tracing::trace!(local = %file.local().display(), %remote, "uploading");

            if let Err(err) = session.put_file(file.local(), &remote) {
                return Err(self.upload_failed(index, file.relative(), err));
            }

            if self.ctx.events.wants_detailed_events() {
                self.ctx.emit(DeployEvent::FileUploaded {
                    index,
                    path: file.relative().to_path_buf(),
                });
            }
        }

        Ok(revision.map(|id| Revision::new(id, chrono::Utc::now().timestamp_millis())))
    }

    fn upload_failed(&self, index: usize, path: &Path, err: RemoteError) -> SlipwayError {
        if matches!(err, RemoteError::Cancelled) {
            return SlipwayError::Cancelled;
        }
        self.ctx.emit(DeployEvent::UploadFailed {
            index,
            path: path.to_path_buf(),
            error: err.to_string(),
        });
        SlipwayError::Upload {
            file: path.to_path_buf(),
            source: err,
        }
    }
}
