//! Category registry and workspace discovery.
//!
//! Categories are a closed, ordered set. Each one knows how to resolve its
//! filesystem roots from the base installation directory and the discovered
//! workspace roots, and whether its value is a single file, a directory, or
//! the set of workspaces.

use crate::error::{BackupError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ocbak_core::BackupConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Directory name prefix that marks an agent workspace under the base directory.
pub const WORKSPACE_PREFIX: &str = "workspace-";

/// A named logical grouping of filesystem paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Main configuration file
    Config,
    /// Provider credentials and tokens
    Credentials,
    /// Wallet keys and state
    Wallet,
    /// Primary and agent workspaces
    Workspace,
    /// Agent session transcripts
    Sessions,
    /// Scheduled job definitions
    Cron,
}

/// Shape of the data a category stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    /// A single file; restored directly to the root path
    File,
    /// A directory tree; restored beneath the root path
    Directory,
    /// Every workspace root, each archived under its directory name
    WorkspaceSet,
}

const ALL: &[Category] = &[
    Category::Config,
    Category::Credentials,
    Category::Wallet,
    Category::Workspace,
    Category::Sessions,
    Category::Cron,
];

impl Category {
    /// All categories in enumeration order.
    pub fn all() -> &'static [Category] {
        ALL
    }

    /// Stable identifier; also the first segment of every archived entry name.
    pub fn id(&self) -> &'static str {
        match self {
            Category::Config => "config",
            Category::Credentials => "credentials",
            Category::Wallet => "wallet",
            Category::Workspace => "workspace",
            Category::Sessions => "sessions",
            Category::Cron => "cron",
        }
    }

    /// Looks up a category by identifier.
    pub fn from_id(id: &str) -> Option<Category> {
        ALL.iter().copied().find(|c| c.id() == id)
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Config => "Configuration",
            Category::Credentials => "Credentials",
            Category::Wallet => "Wallet",
            Category::Workspace => "Workspaces",
            Category::Sessions => "Agent sessions",
            Category::Cron => "Scheduled jobs",
        }
    }

    /// Informational only; sensitive categories are encrypted like any other.
    pub fn is_sensitive(&self) -> bool {
        matches!(
            self,
            Category::Config | Category::Credentials | Category::Wallet
        )
    }

    pub fn kind(&self) -> CategoryKind {
        match self {
            Category::Config => CategoryKind::File,
            Category::Workspace => CategoryKind::WorkspaceSet,
            Category::Credentials | Category::Wallet | Category::Sessions | Category::Cron => {
                CategoryKind::Directory
            }
        }
    }

    pub fn enabled_by_default(&self) -> bool {
        true
    }

    /// Resolves the ordered filesystem roots of this category.
    pub fn resolve_roots(&self, base_dir: &Utf8Path, workspaces: &[Utf8PathBuf]) -> Vec<Utf8PathBuf> {
        match self {
            Category::Config => vec![base_dir.join("openclaw.json")],
            Category::Credentials => vec![base_dir.join("credentials")],
            Category::Wallet => vec![base_dir.join("wallet")],
            Category::Workspace => workspaces.to_vec(),
            Category::Sessions => vec![base_dir.join("agents")],
            Category::Cron => vec![base_dir.join("cron")],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Category {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self> {
        Category::from_id(s).ok_or_else(|| {
            BackupError::InvalidInput(format!(
                "Unknown category '{}'. Valid categories: {}",
                s,
                ALL.iter().map(|c| c.id()).collect::<Vec<_>>().join(", ")
            ))
        })
    }
}

/// Lists subdirectory names of a directory.
///
/// Abstracted so workspace discovery can be tested without a real filesystem.
pub trait DirectoryLister {
    /// Names of the immediate subdirectories of `dir`; empty when `dir` is unreadable.
    fn list_dirs(&self, dir: &Utf8Path) -> Vec<String>;
}

/// Lists directories on the real filesystem. Symlinks are not followed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list_dirs(&self, dir: &Utf8Path) -> Vec<String> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cannot list {}: {}", dir, e);
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect()
    }
}

/// Finds all workspace roots: the primary one first, then every directory
/// under `base_dir` whose name starts with [`WORKSPACE_PREFIX`], sorted by name.
///
/// A discovered directory sharing the primary workspace's name is dropped so
/// that archived workspace names stay unique.
pub fn discover_workspaces(
    base_dir: &Utf8Path,
    primary: &Utf8Path,
    lister: &dyn DirectoryLister,
) -> Vec<Utf8PathBuf> {
    let mut names: Vec<String> = lister
        .list_dirs(base_dir)
        .into_iter()
        .filter(|name| name.starts_with(WORKSPACE_PREFIX) && name.len() > WORKSPACE_PREFIX.len())
        .filter(|name| Some(name.as_str()) != primary.file_name())
        .collect();
    names.sort();
    names.dedup();

    let mut roots = vec![primary.to_path_buf()];
    roots.extend(names.into_iter().map(|name| base_dir.join(name)));
    roots
}

/// Resolved filesystem layout for one engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    base_dir: Utf8PathBuf,
    workspaces: Vec<Utf8PathBuf>,
}

impl Layout {
    pub fn new(base_dir: impl Into<Utf8PathBuf>, workspaces: Vec<Utf8PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            workspaces,
        }
    }

    /// Resolves the layout from configuration, scanning the real filesystem.
    pub fn from_config(config: &BackupConfig) -> Result<Self> {
        Self::with_lister(config, &FsLister)
    }

    /// Resolves the layout from configuration with an injected directory lister.
    pub fn with_lister(config: &BackupConfig, lister: &dyn DirectoryLister) -> Result<Self> {
        let base_dir = config.base_dir()?;
        let primary = config.workspace_dir()?;
        let workspaces = discover_workspaces(&base_dir, &primary, lister);
        Ok(Self::new(base_dir, workspaces))
    }

    pub fn base_dir(&self) -> &Utf8Path {
        &self.base_dir
    }

    pub fn workspaces(&self) -> &[Utf8PathBuf] {
        &self.workspaces
    }

    /// Filesystem roots of a category under this layout.
    pub fn roots(&self, category: Category) -> Vec<Utf8PathBuf> {
        category.resolve_roots(&self.base_dir, &self.workspaces)
    }
}

/// Categories enabled by the configuration, in registry order.
pub fn enabled_categories(config: &BackupConfig) -> Vec<Category> {
    ALL.iter()
        .copied()
        .filter(|c| config.is_category_enabled(c.id(), c.enabled_by_default()))
        .collect()
}

/// Rejects configuration that names categories absent from the registry.
pub fn validate_category_ids(config: &BackupConfig) -> Result<()> {
    for id in config.categories.keys() {
        if Category::from_id(id).is_none() {
            return Err(BackupError::Config(ocbak_core::Error::invalid_config(
                format!("unknown category '{}' in categories", id),
            )));
        }
    }
    Ok(())
}
