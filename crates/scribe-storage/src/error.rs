//! Error types for scribe-storage

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt session: {0}")]
    CorruptSession(String),

    #[error("Invalid license key: {0}")]
    InvalidLicenseKey(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
