//! File filtering for backup collection.
//!
//! - Transient directories (dependency caches, VCS metadata) are skipped at any depth
//! - The backup directory is never collected into its own archives
//! - Configured glob patterns are matched against archive entry names

use crate::error::{BackupError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Directory names that are ALWAYS skipped, wherever they appear.
/// These hold regenerable data that bloats archives.
pub const TRANSIENT_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".hg",
    ".svn",
    ".cache",
    "__pycache__",
    ".venv",
    ".next",
    ".turbo",
    ".gradle",
];

/// Exclusion configuration for collection.
#[derive(Debug, Clone)]
pub struct ExclusionConfig {
    /// Compiled user patterns, matched against entry names
    globset: GlobSet,

    /// Absolute paths never collected (e.g. the backup directory)
    excluded_roots: Vec<Utf8PathBuf>,
}

impl ExclusionConfig {
    /// Creates an exclusion configuration from additional glob patterns.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                BackupError::Config(ocbak_core::Error::invalid_config(format!(
                    "invalid exclusion pattern '{}': {}",
                    pattern, e
                )))
            })?;
            builder.add(glob);
        }

        let globset = builder.build().map_err(|e| {
            BackupError::Config(ocbak_core::Error::invalid_config(format!(
                "failed to build exclusion set: {}",
                e
            )))
        })?;

        Ok(Self {
            globset,
            excluded_roots: Vec::new(),
        })
    }

    /// Never collect anything at or beneath `path`.
    pub fn with_excluded_root(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.excluded_roots.push(path.into());
        self
    }

    /// Returns true if a directory with this name is transient.
    pub fn is_transient(name: &str) -> bool {
        TRANSIENT_DIRS.contains(&name)
    }

    /// Checks an archive entry name against the configured patterns.
    pub fn excludes_entry(&self, entry_name: &str) -> bool {
        self.globset.is_match(entry_name)
    }

    /// Checks whether a filesystem path lies inside an excluded root.
    pub fn excludes_path(&self, path: &Utf8Path) -> bool {
        self.excluded_roots.iter().any(|root| path.starts_with(root))
    }
}
