//! Configuration file loading and defaults
//!
//! The configuration is a small YAML document. Every field is optional;
//! anything omitted falls back to the defaults below.
//!
//! ```yaml
//! base_dir: ~/.openclaw
//! backup_dir: ~/.openclaw/backups
//! categories:
//!   wallet: false
//! exclude:
//!   - "**/*.log"
//! retention:
//!   max_backups: 10
//!   max_age_days: 30
//! ```

use crate::error::{Error, Result};
use crate::utils::{expand_tilde, get_home_dir};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use tracing::debug;

/// Configuration file names searched in the current directory
const CONFIG_FILE_NAMES: &[&str] = &["ocbak.yaml", "ocbak.yml"];

/// Default base installation directory
pub const DEFAULT_BASE_DIR: &str = "~/.openclaw";

/// Directory (relative to the base) holding archives unless configured
pub const DEFAULT_BACKUP_SUBDIR: &str = "backups";

/// Directory (relative to the base) of the primary workspace unless configured
pub const DEFAULT_WORKSPACE_SUBDIR: &str = "workspace";

/// Default compression level (6 = balanced speed/ratio)
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Archive retention rules applied by pruning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetentionPolicy {
    /// Keep at most this many archives (0 = unlimited)
    pub max_backups: usize,

    /// Delete archives older than this many days (0 = never)
    pub max_age_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_backups: 10,
            max_age_days: 30,
        }
    }
}

/// Backup engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackupConfig {
    /// Base installation directory; category roots resolve relative to it
    pub base_dir: Utf8PathBuf,

    /// Primary workspace directory (defaults to `<base_dir>/workspace`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_dir: Option<Utf8PathBuf>,

    /// Directory holding archives (defaults to `<base_dir>/backups`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<Utf8PathBuf>,

    /// Per-category enable flags; categories not listed use their default
    pub categories: BTreeMap<String, bool>,

    /// Additional glob patterns excluded from backups
    pub exclude: Vec<String>,

    /// Retention policy for pruning
    pub retention: RetentionPolicy,

    /// Gzip compression level (1-9)
    pub compression_level: u32,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            base_dir: Utf8PathBuf::from(DEFAULT_BASE_DIR),
            workspace_dir: None,
            backup_dir: None,
            categories: BTreeMap::new(),
            exclude: Vec::new(),
            retention: RetentionPolicy::default(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl BackupConfig {
    /// Load configuration from the specified path or search for it.
    ///
    /// Without an explicit path, `ocbak.yaml`/`ocbak.yml` in the current
    /// directory is tried first, then `~/.openclaw/ocbak.yaml`. When no file
    /// exists the defaults are returned.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let content = match path {
            Some(p) => Some(fs::read_to_string(p).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::config_not_found(p.as_str())
                } else {
                    Error::Io(e)
                }
            })?),
            None => Self::find_config()?,
        };

        let config = match content {
            Some(content) => Self::from_yaml(&content)?,
            None => {
                debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(content)?)
    }

    fn find_config() -> Result<Option<String>> {
        let mut candidates: Vec<Utf8PathBuf> = CONFIG_FILE_NAMES
            .iter()
            .map(|name| Utf8PathBuf::from(*name))
            .collect();
        if let Ok(home) = get_home_dir() {
            candidates.push(home.join(".openclaw").join(CONFIG_FILE_NAMES[0]));
        }

        for candidate in candidates {
            if candidate.is_file() {
                debug!("Loading configuration from {}", candidate);
                return Ok(Some(fs::read_to_string(&candidate)?));
            }
        }
        Ok(None)
    }

    /// Validate value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(1..=9).contains(&self.compression_level) {
            return Err(Error::invalid_config(format!(
                "compression_level must be 1-9, got {}",
                self.compression_level
            )));
        }
        if self.base_dir.as_str().is_empty() {
            return Err(Error::invalid_config("base_dir must not be empty"));
        }
        Ok(())
    }

    /// Base installation directory with `~` expanded.
    pub fn base_dir(&self) -> Result<Utf8PathBuf> {
        expand_tilde(self.base_dir.as_str())
    }

    /// Primary workspace directory.
    pub fn workspace_dir(&self) -> Result<Utf8PathBuf> {
        match &self.workspace_dir {
            Some(dir) => expand_tilde(dir.as_str()),
            None => Ok(self.base_dir()?.join(DEFAULT_WORKSPACE_SUBDIR)),
        }
    }

    /// Directory archives are written to and pruned from.
    pub fn backup_dir(&self) -> Result<Utf8PathBuf> {
        match &self.backup_dir {
            Some(dir) => expand_tilde(dir.as_str()),
            None => Ok(self.base_dir()?.join(DEFAULT_BACKUP_SUBDIR)),
        }
    }

    /// Whether a category is enabled, falling back to `default` when unset.
    pub fn is_category_enabled(&self, id: &str, default: bool) -> bool {
        self.categories.get(id).copied().unwrap_or(default)
    }

    /// Sets the base installation directory.
    pub fn with_base_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Sets the primary workspace directory.
    pub fn with_workspace_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.workspace_dir = Some(dir.into());
        self
    }

    /// Sets the backup directory.
    pub fn with_backup_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.backup_dir = Some(dir.into());
        self
    }

    /// Enables or disables a category.
    pub fn with_category(mut self, id: impl Into<String>, enabled: bool) -> Self {
        self.categories.insert(id.into(), enabled);
        self
    }

    /// Adds exclusion patterns.
    pub fn with_exclusions(mut self, patterns: Vec<String>) -> Self {
        self.exclude.extend(patterns);
        self
    }

    /// Sets the retention policy.
    pub fn with_retention(mut self, max_backups: usize, max_age_days: u32) -> Self {
        self.retention = RetentionPolicy {
            max_backups,
            max_age_days,
        };
        self
    }

    /// Sets the compression level.
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.clamp(1, 9);
        self
    }
}
