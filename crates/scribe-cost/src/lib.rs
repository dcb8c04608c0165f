//! Training cost estimation
//!
//! Evaluates a static catalog of training approaches (local GPUs, cloud
//! rentals, hosted fine-tuning APIs, LoRA/QLoRA variants) against a dataset's
//! token volume and ranks the results by cost.
//!
//! Access control is the caller's concern: this crate never consults a
//! license gate.

pub mod catalog;
pub mod estimator;
pub mod models;

pub use catalog::{Approach, ApiService, Pricing, TrainingMethod, default_catalog};
pub use estimator::{CostEstimator, DEFAULT_EPOCHS};
pub use models::{ModelProfile, default_models};
