//! Result document discovery
//!
//! Walks the results root and keeps files whose root-relative path matches
//! one of the configured glob patterns.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Glob-based selector for result documents
#[derive(Debug, Clone)]
pub struct DocumentMatcher {
    glob_set: GlobSet,
}

impl DocumentMatcher {
    /// Build a matcher from glob patterns (e.g. `**/*.xml`)
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern.as_ref())?);
        }
        Ok(Self {
            glob_set: builder.build()?,
        })
    }

    /// Check a path relative to the results root
    pub fn is_match(&self, rel_path: &Path) -> bool {
        self.glob_set.is_match(rel_path)
    }

    /// Every matching file below `root`, ordered by path.
    ///
    /// Unreadable entries are logged and skipped; a missing root yields
    /// nothing.
    pub fn discover(&self, root: &Path) -> Vec<PathBuf> {
        if !root.is_dir() {
            tracing::warn!("Results directory not found: {}", root.display());
            return Vec::new();
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Ok(rel_path) = path.strip_prefix(root) else {
                continue;
            };

            if self.is_match(rel_path) {
                documents.push(path.to_path_buf());
            }
        }

        documents
    }
}
