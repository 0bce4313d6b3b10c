//! Restore options and their validation

use crate::error::{BackupError, Result};
use crate::registry::Category;
use std::collections::BTreeSet;

/// Options for a restore.
#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    /// Category ids to restore; `None` restores every category in the archive.
    /// An empty list restores nothing.
    pub categories: Option<Vec<String>>,

    /// Compute the result without writing anything
    pub dry_run: bool,
}

impl RestoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the restore to the given category ids.
    pub fn with_categories<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Parses the category filter, rejecting ids the registry does not know.
    pub fn category_filter(&self) -> Result<Option<BTreeSet<Category>>> {
        let Some(ids) = &self.categories else {
            return Ok(None);
        };

        let mut filter = BTreeSet::new();
        for id in ids {
            let category = Category::from_id(id).ok_or_else(|| {
                BackupError::InvalidInput(format!("unknown category '{}'", id))
            })?;
            filter.insert(category);
        }
        Ok(Some(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_options() {
        let options = RestoreOptions::default();
        assert!(!options.dry_run);
        assert!(options.category_filter().unwrap().is_none());
    }

    #[test]
    fn test_category_filter() {
        let options = RestoreOptions::new().with_categories(["workspace", "config", "config"]);
        let filter = options.category_filter().unwrap().unwrap();
        assert_eq!(
            filter.into_iter().collect::<Vec<_>>(),
            vec![Category::Config, Category::Workspace]
        );
    }

    #[test]
    fn test_empty_filter_is_not_none() {
        let options = RestoreOptions::new().with_categories(Vec::<String>::new());
        assert!(options.category_filter().unwrap().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_category_rejected() {
        let options = RestoreOptions::new().with_categories(["photos"]);
        let err = options.category_filter().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
