//! Common test utilities for ocbak-backup
//!
//! - Installation fixtures on temporary directories
//! - Fast and counting key derivations

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;

/// Passphrase used by most tests
pub const TEST_PASSPHRASE: &str = "correct horse battery staple";
