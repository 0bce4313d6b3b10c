//! OpenClaw Backup Engine
//!
//! This crate packages the categorized state of an OpenClaw installation
//! (configuration, credentials, wallet, workspaces, agent sessions and
//! scheduled jobs) into a single encrypted archive, and restores it
//! selectively.
//!
//! # Archive format
//!
//! An archive is a 70-byte header (magic `OCBAK1`, salt, nonce, tag)
//! followed by AES-256-GCM ciphertext. The plaintext is a gzip-compressed
//! tar-style container whose first entry is a JSON manifest. See
//! [`crypto`] and [`container`] for the exact layout.
//!
//! # Features
//!
//! - **Category registry**: a closed set of categories with explicit value kinds
//! - **Workspace discovery**: `workspace-*` directories are picked up automatically
//! - **Authenticated encryption**: wrong passphrases and tampering fail as one error
//! - **Selective restore**: category filter, dry run, per-entry failure reporting
//! - **Retention**: age and count based pruning of a backup directory
//!
//! # Examples
//!
//! ```no_run
//! use ocbak_backup::RestoreOptions;
//! use ocbak_core::BackupConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BackupConfig::load(None)?;
//!
//!     let created = ocbak_backup::create("correct horse battery", &config).await?;
//!     println!("Backup created: {} ({} bytes)", created.path, created.size_bytes);
//!
//!     let options = RestoreOptions::new().with_categories(["config"]).with_dry_run(true);
//!     let preview =
//!         ocbak_backup::restore(&created.path, "correct horse battery", &config, options).await?;
//!     println!("Would restore {} files", preview.file_count);
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod collector;
pub mod compression;
pub mod container;
pub mod crypto;
pub mod error;
pub mod filters;
pub mod manifest;
pub mod registry;
pub mod restore;
pub mod retention;

// Re-export commonly used types
pub use archive::{archive_file_name, ArchiveEngine, ArchiveResult, ARCHIVE_EXTENSION};
pub use collector::{CategoryStatus, Collection, Collector};
pub use crypto::{ArchiveHeader, KeyDerivation, Pbkdf2Sha512, HEADER_LEN, MAGIC};
pub use error::{BackupError, ErrorKind, Result};
pub use filters::ExclusionConfig;
pub use manifest::{BackupManifest, MANIFEST_ENTRY, MANIFEST_VERSION};
pub use registry::{Category, CategoryKind, Layout};
pub use restore::{ArchiveSummary, EntrySummary, RestoreFailure, RestoreOptions, RestoreResult};
pub use retention::{list_archives, prune, prune_dir, ArchiveInfo};

use camino::Utf8Path;
use ocbak_core::BackupConfig;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shortest passphrase callers should accept when creating archives.
pub const MIN_PASSPHRASE_LEN: usize = 8;

/// Creates an archive with the default key derivation.
pub async fn create(passphrase: &str, config: &BackupConfig) -> Result<ArchiveResult> {
    ArchiveEngine::new().create(passphrase, config).await
}

/// Restores an archive with the default key derivation.
pub async fn restore(
    archive_path: &Utf8Path,
    passphrase: &str,
    config: &BackupConfig,
    options: RestoreOptions,
) -> Result<RestoreResult> {
    ArchiveEngine::new()
        .restore(archive_path, passphrase, config, options)
        .await
}

/// Decrypts an archive and lists its contents.
pub async fn inspect(archive_path: &Utf8Path, passphrase: &str) -> Result<ArchiveSummary> {
    ArchiveEngine::new().inspect(archive_path, passphrase).await
}

/// Reports every category's roots, enablement and current size.
pub async fn category_status(config: &BackupConfig) -> Result<Vec<CategoryStatus>> {
    registry::validate_category_ids(config)?;
    let layout = Layout::from_config(config)?;
    let exclusions = ExclusionConfig::new(&config.exclude)?.with_excluded_root(config.backup_dir()?);
    let config = config.clone();

    let status = tokio::task::spawn_blocking(move || {
        collector::category_status(&config, &layout, &exclusions)
    })
    .await?;
    Ok(status)
}
