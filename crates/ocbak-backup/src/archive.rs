//! Archive creation and decoding.
//!
//! Creation collects files per enabled category, packs them behind the
//! manifest, compresses the container and seals it. The finished archive is
//! written through a temporary file in the backup directory and persisted
//! under a timestamp-derived name, so readers never observe a partial file.

use crate::collector::Collector;
use crate::compression;
use crate::container::{self, Entry};
use crate::crypto::{self, KeyDerivation, Pbkdf2Sha512};
use crate::error::{BackupError, Result};
use crate::filters::ExclusionConfig;
use crate::manifest::BackupManifest;
use crate::registry::{self, Layout};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Duration, Utc};
use ocbak_core::BackupConfig;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use zeroize::Zeroizing;

/// File extension of archives.
pub const ARCHIVE_EXTENSION: &str = "ocbak";

/// Attempts at finding a free file name when two archives share a millisecond.
const NAME_ATTEMPTS: i64 = 16;

/// Result of a create operation.
#[derive(Debug, Clone)]
pub struct ArchiveResult {
    /// Path of the written archive
    pub path: Utf8PathBuf,

    /// Manifest stored in the archive
    pub manifest: BackupManifest,

    /// Size of the archive file in bytes
    pub size_bytes: u64,

    /// Wall-clock duration of the operation
    pub duration_ms: u64,

    /// Files that could not be read during collection
    pub skipped: usize,
}

/// Decrypted and unpacked archive contents.
#[derive(Debug)]
pub(crate) struct Decoded {
    pub manifest: BackupManifest,
    pub entries: Vec<Entry>,
    pub size_bytes: u64,
}

/// Creates, restores and inspects archives.
///
/// The engine holds no state besides the key derivation; concurrent calls
/// are independent as long as they target different archive files.
#[derive(Debug, Clone)]
pub struct ArchiveEngine {
    kdf: Arc<dyn KeyDerivation>,
}

impl Default for ArchiveEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveEngine {
    /// Engine using PBKDF2-HMAC-SHA512 with the default iteration count.
    pub fn new() -> Self {
        Self::with_kdf(Arc::new(Pbkdf2Sha512::default()))
    }

    /// Engine using a custom key derivation.
    pub fn with_kdf(kdf: Arc<dyn KeyDerivation>) -> Self {
        Self { kdf }
    }

    /// Creates a new archive of every enabled category.
    pub async fn create(&self, passphrase: &str, config: &BackupConfig) -> Result<ArchiveResult> {
        let start = Instant::now();
        check_passphrase(passphrase)?;
        config.validate()?;
        registry::validate_category_ids(config)?;

        let created_at = Utc::now();
        let layout = Layout::from_config(config)?;
        let backup_dir = config.backup_dir()?;
        let exclusions =
            ExclusionConfig::new(&config.exclude)?.with_excluded_root(backup_dir.clone());
        let categories = registry::enabled_categories(config);
        let compression_level = config.compression_level;

        info!(
            "Creating archive of {} categories from {}",
            categories.len(),
            layout.base_dir()
        );

        let passphrase = Zeroizing::new(passphrase.to_owned());
        let kdf = Arc::clone(&self.kdf);
        let (bytes, manifest, skipped) = tokio::task::spawn_blocking(move || {
            let collection = Collector::new(&layout, &exclusions).collect(&categories);
            let (entries, skipped) = collection.read_entries();

            let manifest = BackupManifest::new(
                created_at,
                ocbak_core::hostname(),
                categories.iter().map(|c| c.id().to_string()).collect(),
                entries.len(),
                entries.iter().map(Entry::size).sum(),
            );
            debug!(
                "Packing {} entries ({} bytes)",
                manifest.file_count, manifest.total_bytes
            );

            let packed = container::pack(
                &manifest.to_bytes()?,
                &entries,
                created_at.timestamp().max(0) as u64,
            )?;
            drop(entries);

            let (compressed, stats) = compression::compress(&packed, compression_level)?;
            debug!(
                "Compressed container {} -> {} bytes",
                stats.original_size, stats.compressed_size
            );

            let sealed = crypto::seal(compressed, passphrase.as_bytes(), kdf.as_ref())?;
            Ok::<_, BackupError>((sealed, manifest, skipped))
        })
        .await??;

        tokio::fs::create_dir_all(&backup_dir).await?;
        let size_bytes = bytes.len() as u64;
        let path = write_archive(backup_dir, created_at, bytes).await?;

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Created {} ({} files, {} bytes, {} skipped) in {} ms",
            path, manifest.file_count, size_bytes, skipped, duration_ms
        );

        Ok(ArchiveResult {
            path,
            manifest,
            size_bytes,
            duration_ms,
            skipped,
        })
    }

    /// Reads, authenticates and unpacks an archive without touching anything else.
    pub(crate) async fn decode(&self, path: &Utf8Path, passphrase: &str) -> Result<Decoded> {
        check_passphrase(passphrase)?;

        let bytes = tokio::fs::read(path).await?;
        let size_bytes = bytes.len() as u64;
        crypto::ArchiveHeader::parse(&bytes)?;

        let passphrase = Zeroizing::new(passphrase.to_owned());
        let kdf = Arc::clone(&self.kdf);
        tokio::task::spawn_blocking(move || {
            let compressed = crypto::open(&bytes, passphrase.as_bytes(), kdf.as_ref())?;
            let packed = Zeroizing::new(compression::decompress(&compressed)?);
            let unpacked = container::unpack(&packed)?;
            let manifest = BackupManifest::from_bytes(&unpacked.manifest)?;
            Ok(Decoded {
                manifest,
                entries: unpacked.entries,
                size_bytes,
            })
        })
        .await?
    }
}

/// Archive file name for a creation time, e.g.
/// `backup-2026-10-19T08-30-00-000Z.ocbak`.
pub fn archive_file_name(created_at: DateTime<Utc>) -> String {
    format!(
        "backup-{}.{}",
        created_at.format("%Y-%m-%dT%H-%M-%S-%3fZ"),
        ARCHIVE_EXTENSION
    )
}

/// Engine-level passphrase check; length policy belongs to callers.
pub(crate) fn check_passphrase(passphrase: &str) -> Result<()> {
    if passphrase.is_empty() {
        return Err(BackupError::InvalidInput(
            "passphrase must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Writes `bytes` to a temporary file in `dir` and persists it without
/// replacing an existing archive.
async fn write_archive(
    dir: Utf8PathBuf,
    created_at: DateTime<Utc>,
    bytes: Vec<u8>,
) -> Result<Utf8PathBuf> {
    tokio::task::spawn_blocking(move || {
        let mut tmp = tempfile::Builder::new()
            .prefix(".ocbak-")
            .suffix(".tmp")
            .tempfile_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;

        let mut attempt = 0;
        loop {
            let path = dir.join(archive_file_name(
                created_at + Duration::milliseconds(attempt),
            ));
            match tmp.persist_noclobber(&path) {
                Ok(_) => return Ok(path),
                Err(e)
                    if e.error.kind() == std::io::ErrorKind::AlreadyExists
                        && attempt + 1 < NAME_ATTEMPTS =>
                {
                    debug!("{} already exists, trying next name", path);
                    tmp = e.file;
                    attempt += 1;
                }
                Err(e) => return Err(BackupError::Io(e.error)),
            }
        }
    })
    .await?
}
