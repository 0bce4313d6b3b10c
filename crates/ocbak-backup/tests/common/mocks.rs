//! Key derivation doubles
//!
//! The production derivation is deliberately slow; tests use a low
//! iteration count and can count how often a key was derived.

#![allow(dead_code)]

use ocbak_backup::crypto::{ArchiveKey, KeyDerivation, Pbkdf2Sha512, SALT_LEN};
use ocbak_backup::ArchiveEngine;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Iteration count used by test derivations
pub const TEST_ITERATIONS: u32 = 1_000;

/// Counts derivations and delegates to a fast PBKDF2
#[derive(Debug, Default)]
pub struct CountingKdf {
    calls: AtomicUsize,
}

impl CountingKdf {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl KeyDerivation for CountingKdf {
    fn derive(&self, passphrase: &[u8], salt: &[u8; SALT_LEN]) -> ArchiveKey {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Pbkdf2Sha512::with_iterations(TEST_ITERATIONS).derive(passphrase, salt)
    }
}

/// Engine with a fast key derivation
pub fn fast_engine() -> ArchiveEngine {
    ArchiveEngine::with_kdf(Arc::new(Pbkdf2Sha512::with_iterations(TEST_ITERATIONS)))
}

/// Engine whose derivations can be counted
pub fn counting_engine() -> (ArchiveEngine, Arc<CountingKdf>) {
    let kdf = Arc::new(CountingKdf::default());
    let engine = ArchiveEngine::with_kdf(kdf.clone());
    (engine, kdf)
}
