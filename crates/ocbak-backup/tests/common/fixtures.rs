//! Installation fixtures
//!
//! Builds a throwaway OpenClaw base directory and a matching configuration.

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use ocbak_core::BackupConfig;
use std::collections::BTreeMap;
use tempfile::TempDir;

/// A temporary installation directory.
pub struct InstallFixture {
    temp_dir: TempDir,
    base: Utf8PathBuf,
}

impl InstallFixture {
    /// Empty installation
    pub fn empty() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf())
            .expect("temp directory is not UTF-8");
        Self { temp_dir, base }
    }

    /// Installation with data in every category
    pub fn populated() -> Self {
        Self::empty()
            .with_file("openclaw.json", r#"{"agent":{"model":"claude"}}"#)
            .with_file("credentials/anthropic.json", r#"{"key":"sk-test"}"#)
            .with_file("credentials/oauth/github.json", "token")
            .with_file("wallet/keystore.json", "wallet-bytes")
            .with_file("workspace/AGENTS.md", "# Agents\n")
            .with_file("workspace/memory/2026-10-19.md", "remember the milk")
            .with_bytes("workspace/assets/logo.bin", (0u8..=255).collect())
            .with_file("workspace-research/notes.md", "research notes")
            .with_file("agents/main/sessions/abc.jsonl", "{\"role\":\"user\"}\n")
            .with_file("cron/jobs.json", "[]")
    }

    pub fn with_file(self, rel: &str, content: &str) -> Self {
        self.with_bytes(rel, content.as_bytes().to_vec())
    }

    pub fn with_bytes(self, rel: &str, content: Vec<u8>) -> Self {
        let path = self.base.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
        }
        std::fs::write(&path, content).expect("Failed to write fixture file");
        self
    }

    pub fn base(&self) -> &Utf8Path {
        &self.base
    }

    /// Configuration rooted at this installation
    pub fn config(&self) -> BackupConfig {
        BackupConfig::default().with_base_dir(self.base.clone())
    }

    pub fn backup_dir(&self) -> Utf8PathBuf {
        self.base.join("backups")
    }
}

/// Every regular file under `dir`, keyed by `/`-separated relative path.
///
/// The `backups` directory is left out.
pub fn snapshot(dir: &Utf8Path) -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.expect("Failed to walk snapshot directory");
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .expect("entry outside snapshot root");
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        if rel.starts_with("backups/") {
            continue;
        }
        let content = std::fs::read(entry.path()).expect("Failed to read snapshot file");
        files.insert(rel, content);
    }
    files
}
