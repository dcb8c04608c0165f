//! Token counting backends and the tokenizer registry
//!
//! Callers select a backend by name at call time; the analyzer and cost
//! estimator only depend on [`TokenizerRegistry::count`] and
//! [`TokenizerRegistry::count_batch`], never on a concrete backend.

pub mod bpe;
pub mod estimator;
pub mod registry;

pub use bpe::{BpeCounter, Encoding};
pub use estimator::{Gpt2Estimator, RatioEstimator, TokenCounter};
pub use registry::TokenizerRegistry;
