//! Local artifact collection
//!
//! Walks the build output directory and returns every regular file not
//! excluded by the ignore patterns, sorted by relative path so uploads run in
//! a deterministic order.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::domain::value_objects::{ArtifactFile, IgnorePatterns, IGNORE_FILE};
use crate::error::{SlipwayError, SlipwayResult};

/// Collect the artifact set under `root`.
///
/// Hidden files are included; `.gitignore` and friends are not consulted,
/// only `patterns`. The `.slipwayignore` file itself is never uploaded.
pub fn collect(root: &Path, patterns: &IgnorePatterns) -> SlipwayResult<Vec<ArtifactFile>> {
    if !root.is_dir() {
        return Err(SlipwayError::ArtifactsNotFound {
            path: root.to_path_buf(),
        });
    }

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(true)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| SlipwayError::Io(std::io::Error::other(e.to_string())))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let relative = match entry.path().strip_prefix(root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => continue,
        };
        if relative == Path::new(IGNORE_FILE) || patterns.is_ignored(&relative, false) {
            tracing::trace!(path = %relative.display(), "skipping ignored artifact");
            continue;
        }

        files.push(ArtifactFile::new(entry.path().to_path_buf(), relative));
    }

    files.sort_by(|a, b| a.relative().cmp(b.relative()));
    tracing::debug!(count = files.len(), root = %root.display(), "collected artifacts");
    Ok(files)
}

/// Relative paths of `files`, for reporting
pub fn relative_paths(files: &[ArtifactFile]) -> Vec<PathBuf> {
    files.iter().map(|f| f.relative().to_path_buf()).collect()
}
