//! Ignore patterns value object
//!
//! Decides which artifact files stay behind on upload, using gitignore
//! semantics. Patterns come from the `deploy.ignore` config list and from an
//! optional `.slipwayignore` file at the root of the artifact directory.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Name of the per-artifact-directory ignore file
pub const IGNORE_FILE: &str = ".slipwayignore";

/// Maximum file size for `.slipwayignore` (64KB)
const MAX_FILE_SIZE: u64 = 65536;

/// Maximum number of patterns allowed
const MAX_PATTERNS: usize = 1000;

/// Compiled artifact exclusion patterns
#[derive(Debug)]
pub struct IgnorePatterns {
    matcher: Gitignore,
    pattern_count: usize,
}

impl Default for IgnorePatterns {
    fn default() -> Self {
        Self::empty()
    }
}

impl IgnorePatterns {
    /// Create an empty pattern set (matches nothing).
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
            pattern_count: 0,
        }
    }

    /// Build patterns for an artifact directory.
    ///
    /// `configured` patterns apply first; lines from `<root>/.slipwayignore`
    /// follow, so the file can re-include with `!pattern`.
    pub fn load(root: &Path, configured: &[String]) -> Result<Self, IgnoreError> {
        let ignore_path = root.join(IGNORE_FILE);
        let mut lines: Vec<(Option<PathBuf>, String)> = configured
            .iter()
            .map(|pattern| (None, pattern.clone()))
            .collect();

        if ignore_path.is_file() {
            let metadata = fs::metadata(&ignore_path)?;
            if metadata.len() > MAX_FILE_SIZE {
                return Err(IgnoreError::FileTooLarge {
                    path: ignore_path,
                    size: metadata.len(),
                    limit: MAX_FILE_SIZE,
                });
            }
            let content = fs::read_to_string(&ignore_path)?;
            lines.extend(
                content
                    .lines()
                    .map(|line| (Some(ignore_path.clone()), line.to_string())),
            );
        }

        Self::build(root, lines)
    }

    /// Compile a list of patterns rooted at `root`.
    pub fn from_patterns(root: &Path, patterns: &[String]) -> Result<Self, IgnoreError> {
        Self::build(
            root,
            patterns.iter().map(|pattern| (None, pattern.clone())),
        )
    }

    fn build<I>(root: &Path, lines: I) -> Result<Self, IgnoreError>
    where
        I: IntoIterator<Item = (Option<PathBuf>, String)>,
    {
        let mut builder = GitignoreBuilder::new(root);
        let mut pattern_count = 0;

        for (source, line) in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            pattern_count += 1;
            if pattern_count > MAX_PATTERNS {
                return Err(IgnoreError::TooManyPatterns {
                    count: pattern_count,
                    limit: MAX_PATTERNS,
                });
            }

            builder
                .add_line(source, trimmed)
                .map_err(|e| IgnoreError::InvalidPattern {
                    pattern: trimmed.to_string(),
                    message: e.to_string(),
                })?;
        }

        let matcher = builder
            .build()
            .map_err(|e| IgnoreError::BuildFailed(e.to_string()))?;

        Ok(Self {
            matcher,
            pattern_count,
        })
    }

    /// Check if a path (relative to the artifact root) should be skipped.
    pub fn is_ignored(&self, rel_path: &Path, is_dir: bool) -> bool {
        self.matcher
            .matched_path_or_any_parents(rel_path, is_dir)
            .is_ignore()
    }

    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    pub fn is_empty(&self) -> bool {
        self.pattern_count == 0
    }
}

/// Errors that can occur when compiling ignore patterns.
#[derive(Debug, Error)]
pub enum IgnoreError {
    #[error(".slipwayignore exceeds {}KB limit ({size} bytes): {}", .limit / 1024, .path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("{count} ignore patterns exceed the {limit} limit")]
    TooManyPatterns { count: usize, limit: usize },

    #[error("invalid ignore pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("failed to build ignore matcher: {0}")]
    BuildFailed(String),

    #[error("IO error reading .slipwayignore: {0}")]
    Io(#[from] std::io::Error),
}
