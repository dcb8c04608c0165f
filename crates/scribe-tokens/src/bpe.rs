use std::sync::OnceLock;

use scribe_core::{Accuracy, Error, Performance, Result};
use tiktoken_rs::CoreBPE;

use crate::TokenCounter;

/// tiktoken vocabularies bundled with tiktoken-rs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// GPT-3.5 and GPT-4
    Cl100kBase,
    /// GPT-4o
    O200kBase,
    /// Codex and text-davinci-002/003
    P50kBase,
}

impl Encoding {
    fn load(&self) -> std::result::Result<CoreBPE, String> {
        let loaded = match self {
            Self::Cl100kBase => tiktoken_rs::cl100k_base(),
            Self::O200kBase => tiktoken_rs::o200k_base(),
            Self::P50kBase => tiktoken_rs::p50k_base(),
        };
        loaded.map_err(|e| e.to_string())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cl100kBase => "cl100k_base",
            Self::O200kBase => "o200k_base",
            Self::P50kBase => "p50k_base",
        }
    }
}

/// Exact, model-specific counter backed by a BPE vocabulary
///
/// The vocabulary is loaded on first use and kept for the life of the
/// counter. A failed load marks the backend unavailable instead of panicking.
pub struct BpeCounter {
    name: String,
    display_name: String,
    encoding: Encoding,
    bpe: OnceLock<Option<CoreBPE>>,
}

impl BpeCounter {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, encoding: Encoding) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            encoding,
            bpe: OnceLock::new(),
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn bpe(&self) -> Option<&CoreBPE> {
        self.bpe
            .get_or_init(|| match self.encoding.load() {
                Ok(bpe) => {
                    tracing::debug!(tokenizer = %self.name, encoding = self.encoding.as_str(), "Loaded BPE vocabulary");
                    Some(bpe)
                }
                Err(e) => {
                    tracing::warn!(tokenizer = %self.name, "Failed to load {}: {}", self.encoding.as_str(), e);
                    None
                }
            })
            .as_ref()
    }
}

impl TokenCounter for BpeCounter {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn is_premium(&self) -> bool {
        true
    }

    fn accuracy(&self) -> Accuracy {
        Accuracy::Exact
    }

    fn performance(&self) -> Performance {
        Performance::Slow
    }

    fn is_available(&self) -> bool {
        self.bpe().is_some()
    }

    fn count(&self, text: &str) -> Result<usize> {
        let bpe = self
            .bpe()
            .ok_or_else(|| Error::TokenizerUnavailable(self.name.clone()))?;
        Ok(bpe.encode_ordinary(text).len())
    }
}
