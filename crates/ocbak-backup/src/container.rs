//! Fixed-block container codec.
//!
//! The container is a ustar tape: every entry is a 512-byte metadata block
//! (name, octal size, additive header checksum) followed by the entry bytes
//! zero-padded to the next block boundary. The manifest is always the first
//! entry and the stream ends with two all-zero blocks.
//!
//! Names are stored only in the 100-byte name field; longer names are
//! rejected rather than truncated or split into the ustar prefix, so a name
//! read back is always exactly the name written.

use crate::error::{BackupError, Result};
use crate::manifest::MANIFEST_ENTRY;
use std::collections::HashSet;
use std::io::Read;
use tar::{Builder, EntryType, Header};

/// Size of a metadata or data block.
pub const BLOCK_SIZE: usize = 512;

/// Width of the name field in a metadata block.
pub const NAME_FIELD_LEN: usize = 100;

/// Permission bits recorded on every entry.
const ENTRY_MODE: u32 = 0o600;

/// A named blob inside the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Forward-slash separated logical path
    pub name: String,

    /// Raw content
    pub data: Vec<u8>,
}

impl Entry {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Result of decoding a container.
#[derive(Debug, Clone)]
pub struct Unpacked {
    /// Raw manifest bytes (first entry)
    pub manifest: Vec<u8>,

    /// Remaining entries in stored order
    pub entries: Vec<Entry>,
}

/// Checks that a logical name can be stored losslessly.
pub fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BackupError::invalid_entry_name(name, "name is empty"));
    }
    if name.len() > NAME_FIELD_LEN {
        return Err(BackupError::invalid_entry_name(
            name,
            format!(
                "{} bytes exceeds the {}-byte name field",
                name.len(),
                NAME_FIELD_LEN
            ),
        ));
    }
    if name.contains('\0') || name.contains('\\') {
        return Err(BackupError::invalid_entry_name(
            name,
            "contains a NUL byte or backslash",
        ));
    }
    if name
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(BackupError::invalid_entry_name(
            name,
            "contains an empty, '.' or '..' segment",
        ));
    }
    Ok(())
}

/// Serializes the manifest and entries into a container.
///
/// Fails fast on an invalid or duplicate entry name.
pub fn pack(manifest: &[u8], entries: &[Entry], mtime: u64) -> Result<Vec<u8>> {
    let payload: usize = entries.iter().map(|e| padded_len(e.data.len())).sum();
    let capacity = padded_len(manifest.len()) + payload + BLOCK_SIZE * (entries.len() + 3);
    let mut builder = Builder::new(Vec::with_capacity(capacity));

    append(&mut builder, MANIFEST_ENTRY, manifest, mtime)?;

    let mut seen = HashSet::with_capacity(entries.len() + 1);
    seen.insert(MANIFEST_ENTRY);
    for entry in entries {
        if !seen.insert(entry.name.as_str()) {
            return Err(BackupError::invalid_entry_name(
                entry.name.as_str(),
                "duplicate entry name",
            ));
        }
        append(&mut builder, &entry.name, &entry.data, mtime)?;
    }

    // into_inner writes the two-block end marker
    Ok(builder.into_inner()?)
}

fn append(builder: &mut Builder<Vec<u8>>, name: &str, data: &[u8], mtime: u64) -> Result<()> {
    validate_entry_name(name)?;

    let mut header = Header::new_ustar();
    header
        .set_path(name)
        .map_err(|e| BackupError::invalid_entry_name(name, e.to_string()))?;
    header.set_entry_type(EntryType::Regular);
    header.set_size(data.len() as u64);
    header.set_mode(ENTRY_MODE);
    header.set_mtime(mtime);
    header.set_cksum();

    builder.append(&header, data)?;
    Ok(())
}

/// Decodes a container produced by [`pack`].
///
/// Every declared size is checked against the bytes remaining before any
/// content is read, so a malformed header yields an error instead of an
/// oversized allocation or a short read.
pub fn unpack(bytes: &[u8]) -> Result<Unpacked> {
    let mut archive = tar::Archive::new(bytes);
    let entries = archive
        .entries()
        .map_err(|e| BackupError::corrupt(format!("unreadable container: {}", e)))?;

    let mut decoded: Vec<Entry> = Vec::new();
    let mut end_of_data: usize = 0;

    for entry in entries {
        let mut entry =
            entry.map_err(|e| BackupError::corrupt(format!("invalid entry header: {}", e)))?;

        let file_pos = usize::try_from(entry.raw_file_position())
            .map_err(|_| BackupError::corrupt("entry offset out of range"))?;
        let remaining = bytes.len().saturating_sub(file_pos);
        let size = usize::try_from(entry.size())
            .ok()
            .filter(|size| *size <= remaining)
            .ok_or_else(|| {
                BackupError::corrupt(format!(
                    "entry declares {} bytes but only {} remain",
                    entry.size(),
                    remaining
                ))
            })?;

        let name = String::from_utf8(entry.path_bytes().into_owned())
            .map_err(|_| BackupError::corrupt("entry name is not valid UTF-8"))?;

        if entry.header().entry_type() != EntryType::Regular {
            return Err(BackupError::corrupt(format!(
                "entry '{}' is not a regular file",
                name
            )));
        }

        let mut data = Vec::with_capacity(size);
        entry
            .read_to_end(&mut data)
            .map_err(|e| BackupError::corrupt(format!("failed to read '{}': {}", name, e)))?;
        if data.len() != size {
            return Err(BackupError::corrupt(format!("entry '{}' is truncated", name)));
        }

        end_of_data = file_pos + padded_len(size);
        decoded.push(Entry { name, data });
    }

    let marker_end = end_of_data + 2 * BLOCK_SIZE;
    if bytes.len() < marker_end || bytes[end_of_data..marker_end].iter().any(|b| *b != 0) {
        return Err(BackupError::corrupt("missing end-of-archive marker"));
    }

    let mut iter = decoded.into_iter();
    match iter.next() {
        Some(first) if first.name == MANIFEST_ENTRY => Ok(Unpacked {
            manifest: first.data,
            entries: iter.collect(),
        }),
        Some(first) => Err(BackupError::corrupt(format!(
            "first entry is '{}', expected the manifest",
            first.name
        ))),
        None => Err(BackupError::corrupt("container holds no manifest")),
    }
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}
