//! File collection per category.
//!
//! Collection walks each enabled category's roots and produces archive entry
//! names of the form `<category>/<relative path>` (or
//! `workspace/<workspace dir>/<relative path>` for workspaces). Read errors
//! on individual paths are logged and counted, never fatal.

use crate::container::{Entry, NAME_FIELD_LEN};
use crate::filters::ExclusionConfig;
use crate::registry::{Category, CategoryKind, Layout};
use camino::{Utf8Path, Utf8PathBuf};
use ocbak_core::BackupConfig;
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A file selected for backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFile {
    pub category: Category,
    /// Archive entry name
    pub name: String,
    /// Absolute source path
    pub source: Utf8PathBuf,
    /// Size at collection time
    pub size: u64,
}

/// Outcome of a collection pass.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Files in deterministic order: registry order, then root order, then name
    pub files: Vec<CollectedFile>,
    /// Paths that could not be read or named
    pub skipped: usize,
}

impl Collection {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Reads every collected file into a container entry.
    ///
    /// Files that disappeared or became unreadable since the walk are
    /// skipped and counted.
    pub fn read_entries(&self) -> (Vec<Entry>, usize) {
        let mut entries = Vec::with_capacity(self.files.len());
        let mut skipped = self.skipped;

        for file in &self.files {
            match std::fs::read(&file.source) {
                Ok(data) => entries.push(Entry::new(file.name.clone(), data)),
                Err(e) => {
                    warn!("Skipping unreadable file {}: {}", file.source, e);
                    skipped += 1;
                }
            }
        }

        (entries, skipped)
    }
}

/// Walks category roots under a resolved layout.
pub struct Collector<'a> {
    layout: &'a Layout,
    exclusions: &'a ExclusionConfig,
}

impl<'a> Collector<'a> {
    pub fn new(layout: &'a Layout, exclusions: &'a ExclusionConfig) -> Self {
        Self { layout, exclusions }
    }

    /// Collects every file of `categories`, in the order given.
    pub fn collect(&self, categories: &[Category]) -> Collection {
        let mut collection = Collection::default();
        for category in categories {
            self.collect_category(*category, &mut collection);
        }
        debug!(
            "Collected {} files ({} skipped)",
            collection.files.len(),
            collection.skipped
        );
        collection
    }

    fn collect_category(&self, category: Category, out: &mut Collection) {
        for root in self.layout.roots(category) {
            if !root.exists() {
                debug!("Skipping absent {} root: {}", category, root);
                continue;
            }

            let prefix = match category.kind() {
                CategoryKind::WorkspaceSet => match root.file_name() {
                    Some(dir_name) => format!("{}/{}", category.id(), dir_name),
                    None => {
                        warn!("Workspace root has no directory name: {}", root);
                        out.skipped += 1;
                        continue;
                    }
                },
                CategoryKind::File | CategoryKind::Directory => category.id().to_string(),
            };

            if category.kind() == CategoryKind::File && !root.is_file() {
                warn!("Skipping {}: expected a file for category {}", root, category.id());
                out.skipped += 1;
                continue;
            }

            if root.is_file() {
                self.collect_single_file(category, &root, &prefix, out);
            } else {
                self.walk_root(category, &root, &prefix, out);
            }
        }
    }

    fn collect_single_file(
        &self,
        category: Category,
        path: &Utf8Path,
        prefix: &str,
        out: &mut Collection,
    ) {
        let Some(file_name) = path.file_name() else {
            out.skipped += 1;
            return;
        };
        let name = format!("{}/{}", prefix, file_name);
        if self.exclusions.excludes_entry(&name) {
            debug!("Excluded by pattern: {}", name);
            return;
        }
        match std::fs::metadata(path) {
            Ok(meta) => self.push(category, name, path.to_path_buf(), meta.len(), out),
            Err(e) => {
                warn!("Skipping unreadable file {}: {}", path, e);
                out.skipped += 1;
            }
        }
    }

    fn walk_root(&self, category: Category, root: &Utf8Path, prefix: &str, out: &mut Collection) {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                let Some(path) = Utf8Path::from_path(e.path()) else {
                    // Counted below when the entry is visited
                    return true;
                };
                if self.exclusions.excludes_path(path) {
                    debug!("Skipping backup directory: {}", path);
                    return false;
                }
                if e.file_type().is_dir()
                    && e.file_name()
                        .to_str()
                        .is_some_and(ExclusionConfig::is_transient)
                {
                    debug!("Skipping transient directory: {}", path);
                    return false;
                }
                match entry_name(root, path, prefix) {
                    Some(name) if self.exclusions.excludes_entry(&name) => {
                        debug!("Excluded by pattern: {}", name);
                        false
                    }
                    _ => true,
                }
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable path under {}: {}", root, e);
                    out.skipped += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                if entry.file_type().is_symlink() {
                    debug!("Skipping symlink: {}", entry.path().display());
                }
                continue;
            }

            let Some(path) = Utf8Path::from_path(entry.path()) else {
                warn!("Skipping non-UTF-8 path: {}", entry.path().display());
                out.skipped += 1;
                continue;
            };
            let Some(name) = entry_name(root, path, prefix) else {
                out.skipped += 1;
                continue;
            };

            match entry.metadata() {
                Ok(meta) => self.push(category, name, path.to_path_buf(), meta.len(), out),
                Err(e) => {
                    warn!("Skipping unreadable file {}: {}", path, e);
                    out.skipped += 1;
                }
            }
        }
    }

    fn push(
        &self,
        category: Category,
        name: String,
        source: Utf8PathBuf,
        size: u64,
        out: &mut Collection,
    ) {
        if name.len() > NAME_FIELD_LEN {
            warn!(
                "Skipping {}: entry name is {} bytes, limit is {}",
                source,
                name.len(),
                NAME_FIELD_LEN
            );
            out.skipped += 1;
            return;
        }
        out.files.push(CollectedFile {
            category,
            name,
            source,
            size,
        });
    }
}

/// Builds `<prefix>/<relative path>` with `/` separators.
fn entry_name(root: &Utf8Path, path: &Utf8Path, prefix: &str) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut name = prefix.to_string();
    for component in rel.components() {
        name.push('/');
        name.push_str(component.as_str());
    }
    Some(name)
}

/// Per-category overview used by the status view.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStatus {
    pub id: &'static str,
    pub label: &'static str,
    pub sensitive: bool,
    pub enabled: bool,
    pub roots: Vec<Utf8PathBuf>,
    /// At least one root exists
    pub present: bool,
    pub file_count: usize,
    pub total_bytes: u64,
}

/// Sizes every registered category without writing anything.
pub fn category_status(
    config: &BackupConfig,
    layout: &Layout,
    exclusions: &ExclusionConfig,
) -> Vec<CategoryStatus> {
    let collector = Collector::new(layout, exclusions);

    Category::all()
        .iter()
        .map(|category| {
            let roots = layout.roots(*category);
            let present = roots.iter().any(|r| r.exists());
            let collection = collector.collect(&[*category]);
            CategoryStatus {
                id: category.id(),
                label: category.label(),
                sensitive: category.is_sensitive(),
                enabled: config.is_category_enabled(category.id(), category.enabled_by_default()),
                roots,
                present,
                file_count: collection.files.len(),
                total_bytes: collection.total_bytes(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn create_install() -> (TempDir, Layout) {
        let temp = TempDir::new().unwrap();
        let base = utf8(&temp);

        fs::write(base.join("openclaw.json"), r#"{"model":"x"}"#).unwrap();
        fs::create_dir_all(base.join("credentials/providers")).unwrap();
        fs::write(base.join("credentials/providers/openai.json"), "token").unwrap();
        fs::create_dir_all(base.join("workspace/notes")).unwrap();
        fs::write(base.join("workspace/notes/todo.md"), "- buy milk").unwrap();
        fs::create_dir_all(base.join("workspace-research")).unwrap();
        fs::write(base.join("workspace-research/paper.md"), "abstract").unwrap();

        fs::create_dir_all(base.join("workspace/node_modules/pkg")).unwrap();
        fs::write(base.join("workspace/node_modules/pkg/index.js"), "x").unwrap();
        fs::create_dir_all(base.join("workspace/.git")).unwrap();
        fs::write(base.join("workspace/.git/HEAD"), "ref").unwrap();

        let layout = Layout::new(
            base.clone(),
            vec![base.join("workspace"), base.join("workspace-research")],
        );
        (temp, layout)
    }

    fn names(collection: &Collection) -> Vec<&str> {
        collection.files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_collect_entry_names() {
        let (_temp, layout) = create_install();
        let exclusions = ExclusionConfig::new(&[]).unwrap();
        let collection = Collector::new(&layout, &exclusions).collect(Category::all());

        assert_eq!(
            names(&collection),
            vec![
                "config/openclaw.json",
                "credentials/providers/openai.json",
                "workspace/workspace/notes/todo.md",
                "workspace/workspace-research/paper.md",
            ]
        );
        assert_eq!(collection.skipped, 0);
        assert_eq!(collection.files[0].category, Category::Config);
        assert_eq!(collection.total_bytes(), 13 + 5 + 10 + 8);
    }

    #[test]
    fn test_collect_only_requested_categories() {
        let (_temp, layout) = create_install();
        let exclusions = ExclusionConfig::new(&[]).unwrap();
        let collection = Collector::new(&layout, &exclusions).collect(&[Category::Credentials]);
        assert_eq!(names(&collection), vec!["credentials/providers/openai.json"]);
    }

    #[test]
    fn test_collect_skips_backup_dir_and_patterns() {
        let (temp, layout) = create_install();
        let base = utf8(&temp);
        fs::create_dir_all(base.join("workspace/backups")).unwrap();
        fs::write(base.join("workspace/backups/old.ocbak"), "OCBAK1").unwrap();
        fs::write(base.join("workspace/notes/scratch.tmp"), "tmp").unwrap();

        let exclusions = ExclusionConfig::new(&["**/*.tmp".to_string()])
            .unwrap()
            .with_excluded_root(base.join("workspace/backups"));
        let collection = Collector::new(&layout, &exclusions).collect(&[Category::Workspace]);

        let names = names(&collection);
        assert!(names.contains(&"workspace/workspace/notes/todo.md"));
        assert!(!names.iter().any(|n| n.ends_with("old.ocbak")));
        assert!(!names.iter().any(|n| n.ends_with(".tmp")));
        assert!(!names.iter().any(|n| n.contains("node_modules")));
    }

    #[test]
    fn test_collect_skips_overlong_names() {
        let (temp, layout) = create_install();
        let long = "n".repeat(NAME_FIELD_LEN);
        fs::write(utf8(&temp).join("credentials").join(&long), "x").unwrap();

        let exclusions = ExclusionConfig::new(&[]).unwrap();
        let collection = Collector::new(&layout, &exclusions).collect(&[Category::Credentials]);
        assert_eq!(names(&collection), vec!["credentials/providers/openai.json"]);
        assert_eq!(collection.skipped, 1);
    }

    #[test]
    fn test_missing_roots_are_silent() {
        let temp = TempDir::new().unwrap();
        let base = utf8(&temp);
        let layout = Layout::new(base.clone(), vec![base.join("workspace")]);
        let exclusions = ExclusionConfig::new(&[]).unwrap();

        let collection = Collector::new(&layout, &exclusions).collect(Category::all());
        assert!(collection.files.is_empty());
        assert_eq!(collection.skipped, 0);
    }

    #[test]
    fn test_file_category_root_that_is_a_directory_is_skipped() {
        let temp = TempDir::new().unwrap();
        let base = utf8(&temp);
        fs::create_dir_all(base.join("openclaw.json/nested")).unwrap();
        fs::write(base.join("openclaw.json/a.json"), "{}").unwrap();
        fs::write(base.join("openclaw.json/nested/b.json"), "{}").unwrap();
        let layout = Layout::new(base.clone(), vec![base.join("workspace")]);
        let exclusions = ExclusionConfig::new(&[]).unwrap();

        let collection = Collector::new(&layout, &exclusions).collect(&[Category::Config]);
        assert!(collection.files.is_empty());
        assert_eq!(collection.skipped, 1);
    }

    #[test]
    fn test_read_entries() {
        let (_temp, layout) = create_install();
        let exclusions = ExclusionConfig::new(&[]).unwrap();
        let collection = Collector::new(&layout, &exclusions).collect(&[Category::Config]);

        let (entries, skipped) = collection.read_entries();
        assert_eq!(skipped, 0);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].data, br#"{"model":"x"}"#);
    }

    #[test]
    fn test_read_entries_counts_vanished_files() {
        let (temp, layout) = create_install();
        let exclusions = ExclusionConfig::new(&[]).unwrap();
        let collection = Collector::new(&layout, &exclusions).collect(&[Category::Credentials]);

        fs::remove_file(utf8(&temp).join("credentials/providers/openai.json")).unwrap();
        let (entries, skipped) = collection.read_entries();
        assert!(entries.is_empty());
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_category_status() {
        let (temp, layout) = create_install();
        let config = BackupConfig::default()
            .with_base_dir(utf8(&temp))
            .with_category("wallet", false);
        let exclusions = ExclusionConfig::new(&[]).unwrap();

        let status = category_status(&config, &layout, &exclusions);
        assert_eq!(status.len(), Category::all().len());

        let workspace = status.iter().find(|s| s.id == "workspace").unwrap();
        assert!(workspace.present);
        assert_eq!(workspace.file_count, 2);
        assert_eq!(workspace.roots.len(), 2);

        let wallet = status.iter().find(|s| s.id == "wallet").unwrap();
        assert!(!wallet.enabled);
        assert!(!wallet.present);
        assert!(wallet.sensitive);
    }
}
