//! Session files

use std::path::{Path, PathBuf};

use scribe_core::Session;

use crate::{Result, StorageError};

pub const SESSION_EXTENSION: &str = "wsession";

/// Reads and writes sessions as pretty-printed JSON
#[derive(Debug, Clone, Default)]
pub struct SessionStore;

impl SessionStore {
    pub fn new() -> Self {
        Self
    }

    /// `path`, with the session extension added when it has none
    pub fn normalize_path(path: &Path) -> PathBuf {
        if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.with_extension(SESSION_EXTENSION)
        }
    }

    /// Write `session` atomically, returning the path written
    pub fn save(&self, session: &Session, path: &Path) -> Result<PathBuf> {
        let path = Self::normalize_path(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(session)?;
        let tmp = path.with_extension(format!("{}.tmp", SESSION_EXTENSION));
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &path)?;

        tracing::info!(path = %path.display(), files = session.files.len(), "Saved session");
        Ok(path)
    }

    /// Read a session and verify every file's chunk fingerprint
    pub fn load(&self, path: &Path) -> Result<Session> {
        let content = std::fs::read_to_string(path)?;
        let session: Session = serde_json::from_str(&content)?;

        if let Some(damaged) = session.files.iter().find(|f| !f.is_intact()) {
            return Err(StorageError::CorruptSession(format!(
                "chunks for {} do not match their recorded hash",
                damaged.path
            )));
        }

        tracing::debug!(path = %path.display(), chunks = session.total_chunks(), "Loaded session");
        Ok(session)
    }
}
