//! Restore system
//!
//! A restore authenticates and unpacks the whole archive before the first
//! write, then resolves every entry against the restoring host's layout.
//! Failures on individual entries are collected and do not stop the rest.

use crate::archive::ArchiveEngine;
use crate::error::Result;
use crate::manifest::BackupManifest;
use crate::registry::{Category, Layout};
use camino::Utf8Path;
use ocbak_core::BackupConfig;
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Instant;
use tokio::fs;
use tracing::{debug, info, warn};

pub mod analysis;
pub mod resolve;
pub mod validation;

pub use analysis::{ArchiveSummary, EntrySummary};
pub use resolve::{entry_category, resolve_destination, Destination};
pub use validation::RestoreOptions;

/// An entry that could not be restored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreFailure {
    pub entry: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct RestoreResult {
    /// Manifest read from the archive
    pub manifest: BackupManifest,

    /// Categories with at least one restored entry, in registry order
    pub restored_categories: Vec<String>,

    /// Entries written (or that would be written on a dry run)
    pub file_count: usize,

    /// Entries that could not be resolved or written
    pub failures: Vec<RestoreFailure>,

    pub dry_run: bool,

    pub duration_ms: u64,
}

impl ArchiveEngine {
    /// Restores an archive into the layout described by `config`.
    pub async fn restore(
        &self,
        archive_path: &Utf8Path,
        passphrase: &str,
        config: &BackupConfig,
        options: RestoreOptions,
    ) -> Result<RestoreResult> {
        let start = Instant::now();
        info!(
            "Starting restore: archive={}, dry_run={}",
            archive_path, options.dry_run
        );

        let filter = options.category_filter()?;
        let layout = Layout::from_config(config)?;

        info!("Stage 1/2: Decrypting and unpacking");
        let decoded = self.decode(archive_path, passphrase).await?;
        info!(
            "Archive from {} at {}: {} files",
            decoded.manifest.hostname, decoded.manifest.created_at, decoded.manifest.file_count
        );

        info!("Stage 2/2: Restoring files");
        let mut restored: BTreeSet<Category> = BTreeSet::new();
        let mut file_count = 0;
        let mut failures = Vec::new();

        for entry in &decoded.entries {
            let Some(category) = entry_category(&entry.name) else {
                debug!("Skipping entry of unknown category: {}", entry.name);
                continue;
            };
            if let Some(filter) = &filter {
                if !filter.contains(&category) {
                    continue;
                }
            }

            let destination = match resolve_destination(&layout, &entry.name) {
                Ok(Some(destination)) => destination,
                Ok(None) => continue,
                Err(e) => {
                    warn!("{}", e);
                    failures.push(RestoreFailure {
                        entry: entry.name.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if options.dry_run {
                debug!("Would restore {} -> {}", entry.name, destination.path);
            } else if let Err(e) = write_file(&destination.path, &entry.data).await {
                warn!("Cannot restore {} to {}: {}", entry.name, destination.path, e);
                failures.push(RestoreFailure {
                    entry: entry.name.clone(),
                    reason: format!("{}: {}", destination.path, e),
                });
                continue;
            }

            restored.insert(destination.category);
            file_count += 1;
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Restore complete: restored={}, failed={}, duration={}ms",
            file_count,
            failures.len(),
            duration_ms
        );

        Ok(RestoreResult {
            manifest: decoded.manifest,
            restored_categories: restored.iter().map(|c| c.id().to_string()).collect(),
            file_count,
            failures,
            dry_run: options.dry_run,
            duration_ms,
        })
    }
}

async fn write_file(path: &Utf8Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, data).await
}
