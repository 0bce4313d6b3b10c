//! # ocbak-core
//!
//! Core library for ocbak providing:
//! - Configuration file parsing (ocbak.yaml) with defaults
//! - Configuration error types
//! - Shared utilities (home directory, hostname, byte formatting)

pub mod config;
pub mod error;
pub mod utils;

pub use config::{BackupConfig, RetentionPolicy};
pub use error::{Error, Result};
pub use utils::{format_bytes, get_home_dir, hostname};
