//! Key derivation and authenticated encryption of archive payloads.
//!
//! Every archive starts with a fixed 70-byte header:
//!
//! ```text
//! offset 0,  len 6   magic "OCBAK1"
//! offset 6,  len 32  salt
//! offset 38, len 16  nonce
//! offset 54, len 16  authentication tag
//! offset 70, len N   ciphertext
//! ```
//!
//! The key is derived with PBKDF2-HMAC-SHA512 from the passphrase and the
//! per-archive salt. The payload is sealed with AES-256-GCM using a 128-bit
//! nonce and a detached 128-bit tag. Salt and nonce are fresh for every
//! archive.

use crate::error::{BackupError, Result};
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use camino::Utf8Path;
use rand::RngCore;
use sha2::Sha512;
use std::fmt;
use tokio::io::AsyncReadExt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES-256-GCM with a 16-byte nonce.
type ArchiveCipher = AesGcm<Aes256, U16>;

/// File magic identifying the archive format.
pub const MAGIC: &[u8; 6] = b"OCBAK1";

pub const SALT_LEN: usize = 32;
pub const NONCE_LEN: usize = 16;
pub const TAG_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

/// Total header length; the ciphertext starts at this offset.
pub const HEADER_LEN: usize = MAGIC.len() + SALT_LEN + NONCE_LEN + TAG_LEN;

/// PBKDF2 iteration count used for every archive.
pub const DEFAULT_ITERATIONS: u32 = 210_000;

/// Derived 256-bit archive key. Wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ArchiveKey([u8; KEY_LEN]);

impl ArchiveKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for ArchiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArchiveKey([REDACTED])")
    }
}

/// Turns a passphrase and salt into an archive key.
pub trait KeyDerivation: Send + Sync + fmt::Debug {
    fn derive(&self, passphrase: &[u8], salt: &[u8; SALT_LEN]) -> ArchiveKey;
}

/// PBKDF2 with an HMAC-SHA512 pseudorandom function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pbkdf2Sha512 {
    iterations: u32,
}

impl Pbkdf2Sha512 {
    /// Archives written with a non-default count cannot be opened by the
    /// default derivation; only tests should use this.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for Pbkdf2Sha512 {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KeyDerivation for Pbkdf2Sha512 {
    fn derive(&self, passphrase: &[u8], salt: &[u8; SALT_LEN]) -> ArchiveKey {
        let mut key = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha512>(passphrase, salt, self.iterations, &mut key);
        let derived = ArchiveKey(key);
        key.zeroize();
        derived
    }
}

/// Parsed fixed-length archive header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
}

impl ArchiveHeader {
    /// Parses the header at the start of `bytes`.
    ///
    /// Fails with an `InvalidArchive` error when the input is shorter than
    /// the header or does not start with [`MAGIC`].
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(BackupError::invalid_archive(format!(
                "file is {} bytes, shorter than the {}-byte header",
                bytes.len(),
                HEADER_LEN
            )));
        }
        if !has_magic(bytes) {
            return Err(BackupError::invalid_archive("bad magic"));
        }

        let (salt, rest) = bytes[MAGIC.len()..HEADER_LEN].split_at(SALT_LEN);
        let (nonce, tag) = rest.split_at(NONCE_LEN);

        let mut header = Self {
            salt: [0u8; SALT_LEN],
            nonce: [0u8; NONCE_LEN],
            tag: [0u8; TAG_LEN],
        };
        header.salt.copy_from_slice(salt);
        header.nonce.copy_from_slice(nonce);
        header.tag.copy_from_slice(tag);
        Ok(header)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        let mut offset = 0;
        for part in [
            MAGIC.as_slice(),
            self.salt.as_slice(),
            self.nonce.as_slice(),
            self.tag.as_slice(),
        ] {
            out[offset..offset + part.len()].copy_from_slice(part);
            offset += part.len();
        }
        out
    }
}

/// True if `bytes` begins with the archive magic.
pub fn has_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}

/// Reads and validates only the header of an archive file.
pub async fn read_header(path: &Utf8Path) -> Result<ArchiveHeader> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut buf = Vec::with_capacity(HEADER_LEN);
    (&mut file).take(HEADER_LEN as u64).read_to_end(&mut buf).await?;
    ArchiveHeader::parse(&buf)
}

/// Encrypts `plaintext` in place under a fresh salt and nonce.
///
/// Returns the complete archive bytes: header followed by ciphertext.
pub fn seal(mut plaintext: Vec<u8>, passphrase: &[u8], kdf: &dyn KeyDerivation) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut salt);
    rand::rng().fill_bytes(&mut nonce);

    let key = kdf.derive(passphrase, &salt);
    let cipher = ArchiveCipher::new(GenericArray::from_slice(key.as_bytes()));
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&nonce), b"", &mut plaintext)
        .map_err(|_| BackupError::Internal("encryption failed".to_string()))?;

    let mut header = ArchiveHeader {
        salt,
        nonce,
        tag: [0u8; TAG_LEN],
    };
    header.tag.copy_from_slice(tag.as_slice());

    let mut out = Vec::with_capacity(HEADER_LEN + plaintext.len());
    out.extend_from_slice(&header.to_bytes());
    out.append(&mut plaintext);
    Ok(out)
}

/// Verifies and decrypts a complete archive.
///
/// The header is checked before any key derivation. Every authentication
/// failure is reported as `DecryptionFailed` and no plaintext is returned.
pub fn open(archive: &[u8], passphrase: &[u8], kdf: &dyn KeyDerivation) -> Result<Vec<u8>> {
    let header = ArchiveHeader::parse(archive)?;
    let mut buffer = archive[HEADER_LEN..].to_vec();

    let key = kdf.derive(passphrase, &header.salt);
    let cipher = ArchiveCipher::new(GenericArray::from_slice(key.as_bytes()));
    if cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(&header.nonce),
            b"",
            &mut buffer,
            GenericArray::from_slice(&header.tag),
        )
        .is_err()
    {
        buffer.zeroize();
        return Err(BackupError::DecryptionFailed);
    }
    Ok(buffer)
}
