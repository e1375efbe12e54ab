//! Persistence error types.

use std::path::PathBuf;

/// Errors that can occur while reading or writing the store.
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    /// Failed to read the store file.
    #[error("Failed to read store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the store file.
    #[error("Failed to write store {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Store contents are not a valid snapshot.
    #[error("Corrupt store {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize the snapshot.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Backend refused the operation.
    #[error("Store unavailable")]
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_display() {
        let err = PersistError::Write {
            path: PathBuf::from("/tmp/data.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("Failed to write store"));
        assert!(err.to_string().contains("/tmp/data.json"));
    }

    #[test]
    fn test_unavailable_display() {
        assert_eq!(PersistError::Unavailable.to_string(), "Store unavailable");
    }
}
