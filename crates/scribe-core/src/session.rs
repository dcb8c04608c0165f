//! Session domain model

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{ChunkAnalysis, CleanOptions, DEFAULT_TOKEN_LIMIT, DEFAULT_TOKENIZER, SplitMethod};

/// Ordered set of processed files plus the last analysis shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::timestamp")]
    pub updated_at: OffsetDateTime,
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub last_analysis: Option<ChunkAnalysis>,
    #[serde(default)]
    pub ui_preferences: UiPreferences,
}

impl Session {
    pub fn new() -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            files: Vec::new(),
            last_analysis: None,
            ui_preferences: UiPreferences::default(),
        }
    }

    /// Add a file record, or return the existing one for the same path
    pub fn add_file(&mut self, path: impl Into<String>) -> &mut FileRecord {
        let path = path.into();
        self.touch();
        let idx = match self.files.iter().position(|f| f.path == path) {
            Some(idx) => idx,
            None => {
                self.files.push(FileRecord::new(path));
                self.files.len() - 1
            }
        };
        &mut self.files[idx]
    }

    pub fn file(&self, path: &str) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Replace the chunks and config recorded for `path`
    pub fn record_chunks(&mut self, path: impl Into<String>, chunks: Vec<String>, config: FileConfig) {
        let record = self.add_file(path);
        record.config = config;
        record.set_chunks(chunks);
    }

    pub fn set_analysis(&mut self, analysis: ChunkAnalysis) {
        self.last_analysis = Some(analysis);
        self.touch();
    }

    pub fn total_chunks(&self) -> usize {
        self.files.iter().map(|f| f.chunks.len()).sum()
    }

    fn touch(&mut self) {
        self.updated_at = OffsetDateTime::now_utc();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    #[serde(default)]
    pub chunks: Vec<String>,
    #[serde(default)]
    pub config: FileConfig,
    /// blake3 fingerprint of `chunks`, checked when a session is loaded
    pub chunks_hash: String,
}

impl FileRecord {
    pub fn new(path: String) -> Self {
        Self {
            path,
            chunks: Vec::new(),
            config: FileConfig::default(),
            chunks_hash: fingerprint(&[]),
        }
    }

    pub fn set_chunks(&mut self, chunks: Vec<String>) {
        self.chunks_hash = fingerprint(&chunks);
        self.chunks = chunks;
    }

    pub fn is_intact(&self) -> bool {
        fingerprint(&self.chunks) == self.chunks_hash
    }
}

/// Processing settings used to produce a file's chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    pub tokenizer: String,
    pub split_method: SplitMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub clean: CleanOptions,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            tokenizer: DEFAULT_TOKENIZER.to_string(),
            split_method: SplitMethod::default(),
            delimiter: None,
            clean: CleanOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiPreferences {
    pub selected_tokenizer: String,
    pub split_method: SplitMethod,
    pub token_limit: usize,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            selected_tokenizer: DEFAULT_TOKENIZER.to_string(),
            split_method: SplitMethod::default(),
            token_limit: DEFAULT_TOKEN_LIMIT,
        }
    }
}

/// Order-sensitive fingerprint of a chunk sequence
pub fn fingerprint(chunks: &[String]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(chunks.len() as u64).to_le_bytes());
    for chunk in chunks {
        hasher.update(&(chunk.len() as u64).to_le_bytes());
        hasher.update(chunk.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
