use rayon::prelude::*;
use scribe_core::{
    DEFAULT_TOKENIZER, Error, LicenseGate, Result, TokenCount, TokenCountMetadata,
    TokenizerDescriptor,
};

use crate::{BpeCounter, Encoding, Gpt2Estimator, RatioEstimator, TokenCounter};

/// Ordered set of token counting backends, selected by name
///
/// The free default is always registered first, and listing order is the
/// registration order, so it is stable for a given license state.
pub struct TokenizerRegistry {
    counters: Vec<Box<dyn TokenCounter>>,
}

impl TokenizerRegistry {
    /// Registry with the built-in backends
    pub fn new() -> Self {
        let counters: Vec<Box<dyn TokenCounter>> = vec![
            Box::new(Gpt2Estimator::new()),
            Box::new(BpeCounter::new(
                "gpt-3.5-turbo",
                "GPT-3.5 Turbo (Exact)",
                Encoding::Cl100kBase,
            )),
            Box::new(BpeCounter::new("gpt-4", "GPT-4 (Exact)", Encoding::Cl100kBase)),
            Box::new(BpeCounter::new("gpt-4o", "GPT-4o (Exact)", Encoding::O200kBase)),
            Box::new(BpeCounter::new(
                "text-davinci-003",
                "Davinci-003 (Exact)",
                Encoding::P50kBase,
            )),
            Box::new(RatioEstimator::claude()),
            Box::new(RatioEstimator::llama2()),
        ];

        Self { counters }
    }

    /// Add a backend after the built-ins
    pub fn register(&mut self, counter: Box<dyn TokenCounter>) -> Result<()> {
        if self.find(counter.name()).is_some() {
            return Err(Error::InvalidConfiguration(format!(
                "Tokenizer '{}' is already registered",
                counter.name()
            )));
        }
        self.counters.push(counter);
        Ok(())
    }

    pub fn default_name(&self) -> &str {
        DEFAULT_TOKENIZER
    }

    pub fn names(&self) -> Vec<&str> {
        self.counters.iter().map(|c| c.name()).collect()
    }

    fn find(&self, name: &str) -> Option<&dyn TokenCounter> {
        self.counters
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    /// Look up a backend the caller is allowed to use
    pub fn resolve(&self, name: &str, gate: &dyn LicenseGate) -> Result<&dyn TokenCounter> {
        let counter = self
            .find(name)
            .ok_or_else(|| Error::UnknownTokenizer(name.to_string()))?;

        if counter.is_premium() && !gate.check_tokenizer_access(name) {
            return Err(Error::AccessDenied(name.to_string()));
        }
        if !counter.is_available() {
            return Err(Error::TokenizerUnavailable(name.to_string()));
        }

        Ok(counter)
    }

    /// Count tokens in one text
    pub fn count(&self, text: &str, name: &str, gate: &dyn LicenseGate) -> Result<TokenCount> {
        let counter = self.resolve(name, gate)?;
        Ok(TokenCount {
            count: counter.count(text)?,
            metadata: metadata(counter),
        })
    }

    /// Count tokens in every text, in parallel, preserving input order
    ///
    /// Access is checked once for the whole batch.
    pub fn count_batch<T>(&self, texts: &[T], name: &str, gate: &dyn LicenseGate) -> Result<Vec<usize>>
    where
        T: AsRef<str> + Sync,
    {
        let counter = self.resolve(name, gate)?;
        let counts = texts
            .par_iter()
            .map(|text| counter.count(text.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(tokenizer = name, texts = texts.len(), "Counted batch");
        Ok(counts)
    }

    pub fn descriptor(&self, name: &str, gate: &dyn LicenseGate) -> Result<TokenizerDescriptor> {
        self.find(name)
            .map(|c| describe(c, gate))
            .ok_or_else(|| Error::UnknownTokenizer(name.to_string()))
    }

    /// Every registered backend, free default first
    pub fn list_available(&self, gate: &dyn LicenseGate) -> Vec<TokenizerDescriptor> {
        self.counters
            .iter()
            .map(|c| describe(c.as_ref(), gate))
            .collect()
    }
}

impl Default for TokenizerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn metadata(counter: &dyn TokenCounter) -> TokenCountMetadata {
    TokenCountMetadata {
        tokenizer: counter.name().to_string(),
        accuracy: counter.accuracy(),
        performance: counter.performance(),
    }
}

fn describe(counter: &dyn TokenCounter, gate: &dyn LicenseGate) -> TokenizerDescriptor {
    let name = counter.name();
    TokenizerDescriptor {
        name: name.to_string(),
        display_name: counter.display_name().to_string(),
        is_premium: counter.is_premium(),
        accuracy: counter.accuracy(),
        performance: counter.performance(),
        available: counter.is_available(),
        has_access: !counter.is_premium() || gate.check_tokenizer_access(name),
    }
}
