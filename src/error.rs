//! Unified error type for all store operations.

use std::path::PathBuf;

/// Things that can go wrong when writing to or recovering the store.
///
/// Reads never produce one of these: a document that cannot be loaded is
/// reported through the log and read as empty instead. See
/// [`DocumentStore::read`](crate::DocumentStore::read).
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The payload handed to `write` was not a JSON object at the top level.
    ///
    /// Nothing touches the disk when this is returned.
    #[error("refusing to persist {kind} as the document root (expected an object)")]
    NotAnObject {
        /// Human-readable name of the offending JSON type ("an array",
        /// "a string", ...).
        kind: &'static str,
    },

    /// Copying the current document aside before overwriting it failed.
    #[error("failed to back up {}: {source}", path.display())]
    Backup {
        /// Path of the backup file that could not be written.
        path: PathBuf,
        /// Underlying file system error.
        #[source]
        source: std::io::Error,
    },

    /// Writing or renaming the new document file failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Path of the document file that could not be replaced.
        path: PathBuf,
        /// Underlying file system error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the document to bytes.
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Renaming the backup over the document during a restore failed.
    #[error("failed to restore {}: {source}", path.display())]
    Restore {
        /// Path of the document file being restored.
        path: PathBuf,
        /// Underlying file system error.
        #[source]
        source: std::io::Error,
    },

    /// A restore was requested but no backup file exists.
    #[error("no backup found at {}", path.display())]
    NoBackup {
        /// Path where the backup was expected.
        path: PathBuf,
    },
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
