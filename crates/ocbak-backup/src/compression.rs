//! Gzip compression of the container payload.
//!
//! The whole container is compressed in memory before encryption, so the
//! ciphertext length reveals only the compressed size.

use crate::error::{BackupError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Highest gzip level accepted.
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Statistics about a compression operation.
#[derive(Debug, Clone, Copy)]
pub struct CompressionStats {
    /// Original uncompressed size in bytes
    pub original_size: u64,

    /// Compressed size in bytes
    pub compressed_size: u64,
}

impl CompressionStats {
    /// Compression ratio (compressed / original).
    pub fn ratio(&self) -> f64 {
        if self.original_size > 0 {
            self.compressed_size as f64 / self.original_size as f64
        } else {
            0.0
        }
    }

    /// Returns compression percentage saved.
    pub fn percentage_saved(&self) -> u8 {
        ((1.0 - self.ratio()).clamp(0.0, 1.0) * 100.0) as u8
    }
}

/// Compresses `data` with gzip at `level` (clamped to 1..=9).
pub fn compress(data: &[u8], level: u32) -> Result<(Vec<u8>, CompressionStats)> {
    let level = level.clamp(1, MAX_COMPRESSION_LEVEL);
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::new(level));
    encoder.write_all(data)?;
    let compressed = encoder.finish()?;

    let stats = CompressionStats {
        original_size: data.len() as u64,
        compressed_size: compressed.len() as u64,
    };
    Ok((compressed, stats))
}

/// Decompresses a gzip stream. Any decoding failure means the payload is corrupt.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| BackupError::corrupt(format!("payload is not valid gzip: {}", e)))?;
    Ok(out)
}
