//! Archive manifest format.
//!
//! The manifest is stored as the first entry of every container under a
//! reserved name that cannot collide with a category id. It is written once
//! at creation and read before any file is restored.

use crate::error::{BackupError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Version of the manifest format.
pub const MANIFEST_VERSION: &str = "1";

/// Reserved container entry name of the manifest.
pub const MANIFEST_ENTRY: &str = ".ocbak-manifest.json";

/// Metadata describing one archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupManifest {
    /// Manifest format version
    pub version: String,

    /// When the backup was created (ISO-8601)
    pub created_at: String,

    /// Host the backup was created on
    pub hostname: String,

    /// Category ids included, in registry order
    pub categories: Vec<String>,

    /// Number of file entries (excluding the manifest)
    pub file_count: usize,

    /// Total uncompressed payload bytes
    pub total_bytes: u64,
}

impl BackupManifest {
    /// Creates a manifest for a backup started at `created_at`.
    pub fn new(
        created_at: DateTime<Utc>,
        hostname: impl Into<String>,
        categories: Vec<String>,
        file_count: usize,
        total_bytes: u64,
    ) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            hostname: hostname.into(),
            categories,
            file_count,
            total_bytes,
        }
    }

    /// Serializes the manifest to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| BackupError::Internal(format!("failed to serialize manifest: {}", e)))
    }

    /// Parses and validates a manifest read from a container.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let manifest: Self = serde_json::from_slice(bytes)
            .map_err(|e| BackupError::corrupt(format!("unreadable manifest: {}", e)))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validates that the manifest is understood by this version.
    pub fn validate(&self) -> Result<()> {
        if self.version != MANIFEST_VERSION {
            return Err(BackupError::corrupt(format!(
                "unsupported manifest version '{}' (expected '{}')",
                self.version, MANIFEST_VERSION
            )));
        }
        Ok(())
    }

    /// Parsed creation time, if the timestamp is well-formed.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
