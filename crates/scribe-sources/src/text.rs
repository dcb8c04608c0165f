use std::path::Path;

use async_trait::async_trait;
use scribe_core::{Error, Result};

use crate::handler::{DocumentLoader, extension};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Plain text and markdown files
pub struct TextLoader;

#[async_trait]
impl DocumentLoader for TextLoader {
    fn can_handle(&self, path: &Path) -> bool {
        matches!(extension(path).as_deref(), Some("txt" | "md" | "text"))
    }

    async fn load(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes.as_slice());

        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "Invalid UTF-8 at byte {}, replacing undecodable bytes",
                    e.valid_up_to()
                );
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

/// Formats that need a text extractor this crate does not ship
pub struct ExternalFormatLoader;

#[async_trait]
impl DocumentLoader for ExternalFormatLoader {
    fn can_handle(&self, path: &Path) -> bool {
        matches!(extension(path).as_deref(), Some("pdf" | "epub"))
    }

    async fn load(&self, path: &Path) -> Result<String> {
        let kind = extension(path).unwrap_or_default().to_uppercase();
        Err(Error::UnsupportedFormat(format!(
            "{} documents need an external text extractor; convert {} to .txt first",
            kind,
            path.display()
        )))
    }
}
