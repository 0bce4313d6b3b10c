//! Mapping archive entry names back to filesystem destinations.

use crate::error::{BackupError, Result};
use crate::registry::{Category, CategoryKind, Layout, WORKSPACE_PREFIX};
use camino::Utf8PathBuf;

/// Where an entry should be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub category: Category,
    pub path: Utf8PathBuf,
}

/// Resolves an entry name against the layout of the restoring host.
///
/// Returns `Ok(None)` for entries whose first segment is not a known
/// category; callers skip those silently. Entries that belong to a known
/// category but cannot be placed safely yield a `CategoryUnresolvable`
/// error for that entry alone.
pub fn resolve_destination(layout: &Layout, name: &str) -> Result<Option<Destination>> {
    let Some(category) = entry_category(name) else {
        return Ok(None);
    };
    let rel = name.split_once('/').map_or("", |(_, rel)| rel);

    check_relative(name, rel)?;
    let roots = layout.roots(category);

    let path = match category.kind() {
        CategoryKind::File => first_root(name, &roots)?,
        CategoryKind::Directory if rel.is_empty() => first_root(name, &roots)?,
        CategoryKind::Directory => first_root(name, &roots)?.join(rel),
        CategoryKind::WorkspaceSet => {
            let (dir_name, inner) = rel.split_once('/').unwrap_or((rel, ""));
            if dir_name.is_empty() || inner.is_empty() {
                return Err(BackupError::unresolvable(
                    name,
                    "workspace entry has no workspace directory or file path",
                ));
            }
            workspace_root(layout, &roots, name, dir_name)?.join(inner)
        }
    };

    Ok(Some(Destination { category, path }))
}

/// The category named by an entry's first path segment, if it is known.
pub fn entry_category(name: &str) -> Option<Category> {
    let category_id = name.split_once('/').map_or(name, |(id, _)| id);
    Category::from_id(category_id)
}

fn first_root(name: &str, roots: &[Utf8PathBuf]) -> Result<Utf8PathBuf> {
    roots
        .first()
        .cloned()
        .ok_or_else(|| BackupError::unresolvable(name, "category has no root on this host"))
}

/// Picks the workspace root named `dir_name`, recreating agent workspaces
/// under the base directory when they do not exist yet.
fn workspace_root(
    layout: &Layout,
    roots: &[Utf8PathBuf],
    name: &str,
    dir_name: &str,
) -> Result<Utf8PathBuf> {
    if let Some(root) = roots.iter().find(|r| r.file_name() == Some(dir_name)) {
        return Ok(root.clone());
    }
    if dir_name.starts_with(WORKSPACE_PREFIX) || dir_name == "workspace" {
        return Ok(layout.base_dir().join(dir_name));
    }
    Err(BackupError::unresolvable(
        name,
        format!("no workspace named '{}' on this host", dir_name),
    ))
}

/// Rejects relative paths that could escape their root.
fn check_relative(name: &str, rel: &str) -> Result<()> {
    if rel.is_empty() {
        return Ok(());
    }
    if rel.contains('\\') || rel.contains('\0') {
        return Err(BackupError::unresolvable(name, "path contains a backslash or NUL"));
    }
    for segment in rel.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(BackupError::unresolvable(
                name,
                format!("unsafe path segment '{}'", segment),
            ));
        }
    }
    Ok(())
}
