use std::path::Path;

use scribe_clean::Cleaner;
use scribe_core::{
    Accuracy, ChunkAnalysis, ChunkPreview, CleanOptions, CostAnalysisResult, CostPreview, Error,
    Feature, LicenseGate, LicensingInfo, Performance, Result, SplitMethod, TokenCount,
    TokenizerDescriptor, UpgradeInfo,
};
use scribe_cost::CostEstimator;
use scribe_sources::LoaderRegistry;
use scribe_tokens::TokenizerRegistry;
use serde::{Deserialize, Serialize};

use crate::Analyzer;

/// Result of counting a sample with one tokenizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizerComparison {
    pub tokenizer: String,
    pub display_name: String,
    pub is_premium: bool,
    pub has_access: bool,
    #[serde(flatten)]
    pub outcome: ComparisonOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Counted {
        count: usize,
        accuracy: Accuracy,
        performance: Performance,
    },
    Failed {
        reason: String,
    },
}

/// Chunk analysis plus the cost analysis built from its token total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    pub analysis: ChunkAnalysis,
    pub cost_analysis: CostAnalysisResult,
}

/// Facade over loading, cleaning, splitting, counting and cost estimation
///
/// Holds no chunks or analysis between calls; callers pass what they want
/// processed and keep the results.
pub struct ProcessingController {
    registry: TokenizerRegistry,
    cleaner: Cleaner,
    loaders: LoaderRegistry,
    estimator: CostEstimator,
    license: Box<dyn LicenseGate>,
}

impl ProcessingController {
    pub fn new(license: Box<dyn LicenseGate>) -> Self {
        Self {
            registry: TokenizerRegistry::new(),
            cleaner: Cleaner::new(),
            loaders: LoaderRegistry::new(),
            estimator: CostEstimator::new(),
            license,
        }
    }

    pub fn registry_mut(&mut self) -> &mut TokenizerRegistry {
        &mut self.registry
    }

    pub fn loaders_mut(&mut self) -> &mut LoaderRegistry {
        &mut self.loaders
    }

    pub fn license(&self) -> &dyn LicenseGate {
        self.license.as_ref()
    }

    fn analyzer(&self) -> Analyzer<'_> {
        Analyzer::new(&self.registry, self.license.as_ref())
    }

    /// Fail with `AccessDenied` unless the license grants `feature`
    pub fn require(&self, feature: Feature) -> Result<()> {
        if self.license.check_feature_access(feature.as_str()) {
            Ok(())
        } else {
            Err(Error::AccessDenied(feature.to_string()))
        }
    }

    /// Clean then split raw text into chunks
    pub fn process_text(
        &self,
        raw: &str,
        clean: &CleanOptions,
        method: SplitMethod,
        delimiter: Option<&str>,
    ) -> Result<Vec<String>> {
        let (cleaned, stats) = self.cleaner.clean_with_report(raw, clean);
        for stat in &stats {
            tracing::debug!(rule = ?stat.rule, count = stat.count, "Cleaning rule applied");
        }

        let chunks = scribe_core::split(&cleaned, method, delimiter)?;
        tracing::info!(method = %method, chunks = chunks.len(), "Processed text");
        Ok(chunks)
    }

    /// Raw document text, before cleaning
    pub async fn load_document(&self, path: &Path) -> Result<String> {
        self.loaders.load(path).await
    }

    /// Load a document from disk, then clean and split it
    pub async fn process_book(
        &self,
        path: &Path,
        clean: &CleanOptions,
        method: SplitMethod,
        delimiter: Option<&str>,
    ) -> Result<Vec<String>> {
        let raw = self.load_document(path).await?;
        self.process_text(&raw, clean, method, delimiter)
    }

    pub fn get_token_count(&self, text: &str, tokenizer: &str) -> Result<TokenCount> {
        self.registry.count(text, tokenizer, self.license.as_ref())
    }

    /// Token counts for each chunk, in chunk order
    pub fn count_chunks(&self, chunks: &[String], tokenizer: &str) -> Result<Vec<usize>> {
        self.registry
            .count_batch(chunks, tokenizer, self.license.as_ref())
    }

    pub fn get_available_tokenizers(&self) -> Vec<TokenizerDescriptor> {
        self.registry.list_available(self.license.as_ref())
    }

    pub fn analyze_chunks(
        &self,
        chunks: &[String],
        tokenizer: &str,
        token_limit: usize,
    ) -> Result<ChunkAnalysis> {
        self.analyzer().analyze(chunks, tokenizer, token_limit)
    }

    pub fn preview_chunks(
        &self,
        chunks: &[String],
        tokenizer: &str,
        token_limit: usize,
        max_items: usize,
    ) -> Result<Vec<ChunkPreview>> {
        self.analyzer()
            .preview(chunks, tokenizer, token_limit, max_items)
    }

    /// Count `sample` with up to `max_tokenizers` available backends
    ///
    /// A backend the license does not cover is reported as failed rather
    /// than aborting the comparison. Counted results come first, fewest
    /// tokens first; failures keep registry order after them.
    pub fn compare_tokenizers(&self, sample: &str, max_tokenizers: usize) -> Vec<TokenizerComparison> {
        let mut results: Vec<TokenizerComparison> = self
            .get_available_tokenizers()
            .into_iter()
            .filter(|desc| desc.available)
            .take(max_tokenizers)
            .map(|desc| {
                let outcome = match self.get_token_count(sample, &desc.name) {
                    Ok(result) => ComparisonOutcome::Counted {
                        count: result.count,
                        accuracy: result.metadata.accuracy,
                        performance: result.metadata.performance,
                    },
                    Err(e) => ComparisonOutcome::Failed {
                        reason: e.to_string(),
                    },
                };
                TokenizerComparison {
                    tokenizer: desc.name,
                    display_name: desc.display_name,
                    is_premium: desc.is_premium,
                    has_access: desc.has_access,
                    outcome,
                }
            })
            .collect();

        results.sort_by_key(|result| match result.outcome {
            ComparisonOutcome::Counted { count, .. } => (false, count),
            ComparisonOutcome::Failed { .. } => (true, 0),
        });
        results
    }

    /// Chunk analysis plus training cost estimates; requires advanced cost analysis
    pub fn analyze_chunks_with_costs<S: AsRef<str>>(
        &self,
        chunks: &[String],
        tokenizer: &str,
        token_limit: usize,
        target_models: &[S],
        api_usage_monthly: u64,
    ) -> Result<CostReport> {
        self.require(Feature::AdvancedCostAnalysis)?;

        let analysis = self.analyze_chunks(chunks, tokenizer, token_limit)?;
        let cost_analysis =
            self.estimator
                .estimate(analysis.total_tokens, target_models, api_usage_monthly)?;
        Ok(cost_report(analysis, cost_analysis))
    }

    /// Same as [`Self::analyze_chunks_with_costs`], with the estimate run on
    /// the blocking thread pool
    pub async fn spawn_cost_analysis(
        &self,
        chunks: &[String],
        tokenizer: &str,
        token_limit: usize,
        target_models: Vec<String>,
        api_usage_monthly: u64,
    ) -> Result<CostReport> {
        self.require(Feature::AdvancedCostAnalysis)?;

        let analysis = self.analyze_chunks(chunks, tokenizer, token_limit)?;
        let estimator = self.cost_estimator();
        let total_tokens = analysis.total_tokens;
        let cost_analysis = tokio::task::spawn_blocking(move || {
            estimator.estimate(total_tokens, target_models.as_slice(), api_usage_monthly)
        })
        .await
        .map_err(|e| Error::Other(anyhow::anyhow!("Cost estimation task failed: {}", e)))??;
        Ok(cost_report(analysis, cost_analysis))
    }

    /// Rough cost band available on every license
    pub fn cost_preview(&self, total_tokens: usize) -> CostPreview {
        self.estimator.preview(total_tokens)
    }

    /// A copy of the estimator, for running estimates off the caller's thread
    pub fn cost_estimator(&self) -> CostEstimator {
        self.estimator.clone()
    }

    pub fn get_licensing_info(&self) -> LicensingInfo {
        self.license.licensing_info()
    }

    pub fn get_upgrade_info(&self) -> UpgradeInfo {
        self.license.upgrade_info()
    }

    pub fn start_trial(&mut self) -> bool {
        let started = self.license.start_trial();
        tracing::info!(started, "Trial requested");
        started
    }
}

fn cost_report(analysis: ChunkAnalysis, cost_analysis: CostAnalysisResult) -> CostReport {
    tracing::info!(
        tokens = analysis.total_tokens,
        estimates = cost_analysis.ranked.len(),
        "Estimated training cost"
    );
    CostReport {
        analysis,
        cost_analysis,
    }
}
