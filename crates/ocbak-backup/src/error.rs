//! Error types for the archive engine

use thiserror::Error;

/// Result type alias using the engine's error type
pub type Result<T> = std::result::Result<T, BackupError>;

/// Coarse error classification exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad magic or truncated header; rejected before any cryptography
    InvalidArchive,
    /// Wrong passphrase, tampered ciphertext or tag mismatch
    DecryptionFailed,
    /// Decrypted payload is not a valid compressed container
    CorruptArchive,
    /// A restore destination could not be resolved or written
    CategoryUnresolvable,
    /// Caller supplied unusable input (empty passphrase, bad entry name)
    InvalidInput,
    /// Configuration could not be loaded or is invalid
    Config,
    /// Filesystem error
    Io,
    /// Unexpected internal failure
    Internal,
}

/// Archive engine errors
#[derive(Error, Debug)]
pub enum BackupError {
    /// File is not an archive produced by this engine
    #[error("Invalid archive: {reason}")]
    InvalidArchive { reason: String },

    /// Authenticated decryption failed. The cause is deliberately not recorded.
    #[error("Decryption failed: wrong passphrase or corrupted archive")]
    DecryptionFailed,

    /// Decryption succeeded but the payload could not be decoded
    #[error("Corrupt archive: {reason}")]
    CorruptArchive { reason: String },

    /// A single entry could not be restored
    #[error("Cannot restore '{entry}': {reason}")]
    CategoryUnresolvable { entry: String, reason: String },

    /// An entry name cannot be stored in the container
    #[error("Invalid entry name '{name}': {reason}")]
    InvalidEntryName { name: String, reason: String },

    /// Invalid caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ocbak_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error (serialization, background task failure)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BackupError {
    /// Create an invalid archive error
    pub fn invalid_archive(reason: impl Into<String>) -> Self {
        Self::InvalidArchive {
            reason: reason.into(),
        }
    }

    /// Create a corrupt archive error
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptArchive {
            reason: reason.into(),
        }
    }

    /// Create a per-entry restore error
    pub fn unresolvable(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CategoryUnresolvable {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid entry name error
    pub fn invalid_entry_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEntryName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArchive { .. } => ErrorKind::InvalidArchive,
            Self::DecryptionFailed => ErrorKind::DecryptionFailed,
            Self::CorruptArchive { .. } => ErrorKind::CorruptArchive,
            Self::CategoryUnresolvable { .. } => ErrorKind::CategoryUnresolvable,
            Self::InvalidEntryName { .. } | Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<tokio::task::JoinError> for BackupError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("background task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            BackupError::invalid_archive("bad magic").kind(),
            ErrorKind::InvalidArchive
        );
        assert_eq!(BackupError::DecryptionFailed.kind(), ErrorKind::DecryptionFailed);
        assert_eq!(BackupError::corrupt("bad gzip").kind(), ErrorKind::CorruptArchive);
        assert_eq!(
            BackupError::unresolvable("config/x", "denied").kind(),
            ErrorKind::CategoryUnresolvable
        );
        assert_eq!(
            BackupError::invalid_entry_name("x", "too long").kind(),
            ErrorKind::InvalidInput
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(BackupError::from(io).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_decryption_message_does_not_leak_cause() {
        let msg = BackupError::DecryptionFailed.to_string();
        assert!(msg.contains("wrong passphrase or corrupted archive"));
    }
}
