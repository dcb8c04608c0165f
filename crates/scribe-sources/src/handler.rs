//! Document loader trait

use std::path::Path;

use async_trait::async_trait;
use scribe_core::{Error, Result};

use crate::{ExternalFormatLoader, TextLoader};

/// Trait for reading one kind of document into raw text
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Check if this loader understands the given path
    fn can_handle(&self, path: &Path) -> bool;

    /// Read the whole document as text
    async fn load(&self, path: &Path) -> Result<String>;
}

/// Lowercased file extension, if any
pub(crate) fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Dispatches a path to the first loader that can handle it
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn DocumentLoader>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self {
            loaders: vec![Box::new(TextLoader), Box::new(ExternalFormatLoader)],
        }
    }

    /// Add a loader; it takes precedence over the built-ins
    pub fn register(&mut self, loader: Box<dyn DocumentLoader>) {
        self.loaders.insert(0, loader);
    }

    pub fn can_load(&self, path: &Path) -> bool {
        self.loaders.iter().any(|l| l.can_handle(path))
    }

    pub async fn load(&self, path: &Path) -> Result<String> {
        let loader = self
            .loaders
            .iter()
            .find(|l| l.can_handle(path))
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!("No loader for {}", path.display()))
            })?;

        let text = loader.load(path).await?;
        tracing::debug!(path = %path.display(), chars = text.len(), "Loaded document");
        Ok(text)
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct Shouting;

    #[async_trait]
    impl DocumentLoader for Shouting {
        fn can_handle(&self, path: &Path) -> bool {
            extension(path).as_deref() == Some("txt")
        }

        async fn load(&self, _path: &Path) -> Result<String> {
            Ok("LOUD".to_string())
        }
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(extension(Path::new("Book.TXT")).as_deref(), Some("txt"));
        assert_eq!(extension(Path::new("README")), None);
    }

    #[tokio::test]
    async fn test_unknown_extension_unsupported() {
        let registry = LoaderRegistry::new();
        let path = PathBuf::from("notes.docx");

        assert!(!registry.can_load(&path));
        assert!(matches!(
            registry.load(&path).await,
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_registered_loader_takes_precedence() {
        let mut registry = LoaderRegistry::new();
        registry.register(Box::new(Shouting));

        let text = registry.load(Path::new("missing.txt")).await.unwrap();
        assert_eq!(text, "LOUD");
    }
}
