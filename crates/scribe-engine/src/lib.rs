//! Processing pipeline for scribe
//!
//! [`ProcessingController`] is the single entry point front ends talk to:
//! load, clean and split documents, count tokens, analyze chunk fit and
//! estimate training cost, with premium operations checked against a
//! license gate.

pub mod analyzer;
pub mod controller;

pub use analyzer::{Analyzer, summarize};
pub use controller::{ComparisonOutcome, CostReport, ProcessingController, TokenizerComparison};
