//! Read-only archive inspection

use crate::archive::ArchiveEngine;
use crate::error::Result;
use crate::manifest::BackupManifest;
use crate::registry::Category;
use crate::restore::resolve::entry_category;
use camino::Utf8Path;
use serde::Serialize;
use tracing::info;

/// One entry of an inspected archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub name: String,
    /// Category id, if the entry belongs to a known category
    pub category: Option<String>,
    pub size: u64,
}

/// Decrypted view of an archive.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveSummary {
    pub manifest: BackupManifest,
    pub entries: Vec<EntrySummary>,
    /// Size of the archive file
    pub size_bytes: u64,
}

impl ArchiveSummary {
    /// File count and byte total per category, in registry order.
    pub fn category_totals(&self) -> Vec<(&'static str, usize, u64)> {
        Category::all()
            .iter()
            .filter_map(|category| {
                let (count, bytes) = self
                    .entries
                    .iter()
                    .filter(|e| e.category.as_deref() == Some(category.id()))
                    .fold((0usize, 0u64), |(n, b), e| (n + 1, b + e.size));
                (count > 0).then_some((category.id(), count, bytes))
            })
            .collect()
    }
}

impl ArchiveEngine {
    /// Decrypts and lists an archive without writing anything.
    pub async fn inspect(&self, archive_path: &Utf8Path, passphrase: &str) -> Result<ArchiveSummary> {
        info!("Inspecting archive: {}", archive_path);
        let decoded = self.decode(archive_path, passphrase).await?;

        let entries = decoded
            .entries
            .iter()
            .map(|entry| {
                let category = entry_category(&entry.name).map(|c| c.id().to_string());
                EntrySummary {
                    name: entry.name.clone(),
                    category,
                    size: entry.size(),
                }
            })
            .collect();

        Ok(ArchiveSummary {
            manifest: decoded.manifest,
            entries,
            size_bytes: decoded.size_bytes,
        })
    }
}
