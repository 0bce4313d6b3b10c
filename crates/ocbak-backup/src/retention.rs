//! Listing and pruning archives in a backup directory.
//!
//! Archives are found by file extension; age is the file modification time.
//! Pruning runs two phases: everything older than the age limit goes first,
//! then the directory is listed again and the oldest archives beyond the
//! count limit are removed. A limit of zero disables its phase.

use crate::archive::ARCHIVE_EXTENSION;
use crate::crypto;
use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Duration, Utc};
use ocbak_core::{BackupConfig, RetentionPolicy};
use serde::Serialize;
use std::io::ErrorKind;
use tokio::fs;
use tracing::{debug, info, warn};

/// An archive file found in a backup directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveInfo {
    pub filename: String,
    pub path: Utf8PathBuf,
    pub size_bytes: u64,
    /// Modification time of the file
    pub created_at: DateTime<Utc>,
    /// Whether the file starts with a well-formed header
    pub valid: bool,
}

/// Lists archives in `dir`, newest first.
///
/// A missing directory yields an empty list. Files that vanish while
/// listing are left out.
pub async fn list_archives(dir: &Utf8Path) -> Result<Vec<ArchiveInfo>> {
    let mut read_dir = match fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut archives = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let Ok(filename) = entry.file_name().into_string() else {
            continue;
        };
        if !is_archive_name(&filename) {
            continue;
        }

        let path = dir.join(&filename);
        let metadata = match entry.metadata().await {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                debug!("Skipping {}: {}", path, e);
                continue;
            }
        };
        let created_at = match metadata.modified() {
            Ok(time) => DateTime::<Utc>::from(time),
            Err(e) => {
                debug!("Skipping {}: no modification time: {}", path, e);
                continue;
            }
        };
        let valid = crypto::read_header(&path).await.is_ok();

        archives.push(ArchiveInfo {
            filename,
            path,
            size_bytes: metadata.len(),
            created_at,
            valid,
        });
    }

    archives.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.filename.cmp(&a.filename))
    });
    Ok(archives)
}

/// Applies the configured retention policy to the backup directory.
///
/// Returns the file names that were deleted.
pub async fn prune(config: &BackupConfig) -> Result<Vec<String>> {
    config.validate()?;
    let dir = config.backup_dir()?;
    prune_dir(&dir, &config.retention, Utc::now()).await
}

/// Applies `policy` to `dir` as of `now`.
pub async fn prune_dir(
    dir: &Utf8Path,
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> Result<Vec<String>> {
    let mut deleted = Vec::new();

    if policy.max_age_days > 0 {
        let cutoff = now - Duration::days(i64::from(policy.max_age_days));
        let expired = list_archives(dir)
            .await?
            .into_iter()
            .filter(|archive| archive.created_at < cutoff);
        remove_all(expired, &mut deleted).await;
    }

    if policy.max_backups > 0 {
        let excess = list_archives(dir).await?.into_iter().skip(policy.max_backups);
        remove_all(excess, &mut deleted).await;
    }

    if !deleted.is_empty() {
        info!("Pruned {} archives from {}", deleted.len(), dir);
    }
    Ok(deleted)
}

fn is_archive_name(filename: &str) -> bool {
    Utf8Path::new(filename).extension() == Some(ARCHIVE_EXTENSION)
}

/// Deletes every archive in `archives`, recording the names actually removed.
/// A failed delete is logged and the rest are still attempted.
async fn remove_all(archives: impl IntoIterator<Item = ArchiveInfo>, deleted: &mut Vec<String>) {
    for archive in archives {
        if remove_archive(&archive).await {
            deleted.push(archive.filename);
        }
    }
}

/// Deletes one archive; returns true if this call removed it.
async fn remove_archive(archive: &ArchiveInfo) -> bool {
    match fs::remove_file(&archive.path).await {
        Ok(()) => {
            debug!("Deleted {}", archive.path);
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} already removed", archive.path);
            false
        }
        Err(e) => {
            warn!("Failed to delete {}: {}", archive.path, e);
            false
        }
    }
}
