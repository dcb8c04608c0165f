//! Storage layer for scribe
//!
//! This crate provides:
//! - Session files (JSON snapshots of processed documents)
//! - The file-backed license and trial state

pub mod error;
pub mod license;
pub mod session;

pub use error::{Result, StorageError};
pub use license::{FileLicense, TRIAL_DAYS, issue_key, validate_key};
pub use session::{SESSION_EXTENSION, SessionStore};

use std::path::PathBuf;

/// Per-user data directory for sessions and license state
pub fn data_dir() -> PathBuf {
    if let Some(dirs) = directories::ProjectDirs::from("ai", "wolflow", "scribe") {
        dirs.data_dir().to_path_buf()
    } else {
        PathBuf::from("~/.scribe")
    }
}
