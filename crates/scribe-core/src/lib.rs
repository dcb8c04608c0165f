//! Core domain models and logic for scribe
//!
//! This crate contains:
//! - Domain models (chunks, analysis, cost estimates, sessions)
//! - The chunk splitter (deterministic document segmentation)
//! - The license gate seam consumed by the tokenizer registry and controller

pub mod analysis;
pub mod chunk;
pub mod cost;
pub mod error;
pub mod license;
pub mod session;
pub mod split;
pub mod tokenizer;

pub use analysis::{ChunkAnalysis, ChunkPreview, ChunkStatus, TokenDistribution};
pub use chunk::{CleanOptions, SplitMethod};
pub use cost::{
    ApproachCategory, BestOption, CostAnalysisResult, CostEstimate, CostPreview, CostRange,
    CostSummary, HardwareRequirements, ModelCosts, RoiProjection,
};
pub use error::{Error, Result};
pub use license::{Feature, LicenseGate, LicenseStatus, LicensingInfo, StaticLicense, UpgradeInfo};
pub use session::{FileConfig, FileRecord, Session, UiPreferences};
pub use split::{join, split};
pub use tokenizer::{Accuracy, Performance, TokenCount, TokenCountMetadata, TokenizerDescriptor};

/// Token limit applied when nothing else is configured
pub const DEFAULT_TOKEN_LIMIT: usize = 512;

/// Name of the free tokenizer every installation can use
pub const DEFAULT_TOKENIZER: &str = "gpt2";
