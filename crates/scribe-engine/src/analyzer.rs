//! Chunk analysis against a token limit

use scribe_core::{
    Accuracy, ChunkAnalysis, ChunkPreview, ChunkStatus, Error, LicenseGate, Performance, Result,
    TokenDistribution,
};
use scribe_tokens::TokenizerRegistry;

const SHORT_CHUNK_TOKENS: usize = 50;
const EXACT_TOKENIZER_HINT_TOKENS: usize = 5000;
const FAST_TOKENIZER_HINT_CHUNKS: usize = 100;
const EXCERPT_CHARS: usize = 300;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn check_limit(token_limit: usize) -> Result<()> {
    if token_limit == 0 {
        return Err(Error::InvalidConfiguration(
            "Token limit must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Counts chunks with one registry and gate; holds no results between calls
pub struct Analyzer<'a> {
    registry: &'a TokenizerRegistry,
    gate: &'a dyn LicenseGate,
}

impl<'a> Analyzer<'a> {
    pub fn new(registry: &'a TokenizerRegistry, gate: &'a dyn LicenseGate) -> Self {
        Self { registry, gate }
    }

    pub fn analyze(&self, chunks: &[String], tokenizer: &str, token_limit: usize) -> Result<ChunkAnalysis> {
        check_limit(token_limit)?;
        let counter = self.registry.resolve(tokenizer, self.gate)?;
        let counts = self.registry.count_batch(chunks, tokenizer, self.gate)?;

        let analysis = summarize(
            tokenizer,
            counter.accuracy(),
            counter.performance(),
            &counts,
            token_limit,
        );
        tracing::debug!(
            tokenizer,
            chunks = analysis.total_chunks,
            tokens = analysis.total_tokens,
            over_limit = analysis.over_limit,
            efficiency = analysis.efficiency_score,
            "Analyzed chunks"
        );
        Ok(analysis)
    }

    /// Per-chunk fit for the first `max_items` chunks
    pub fn preview(
        &self,
        chunks: &[String],
        tokenizer: &str,
        token_limit: usize,
        max_items: usize,
    ) -> Result<Vec<ChunkPreview>> {
        check_limit(token_limit)?;
        let shown = &chunks[..chunks.len().min(max_items)];
        let counts = self.registry.count_batch(shown, tokenizer, self.gate)?;

        Ok(shown
            .iter()
            .zip(counts)
            .enumerate()
            .map(|(i, (chunk, tokens))| ChunkPreview {
                index: i + 1,
                tokens,
                status: ChunkStatus::classify(tokens, token_limit),
                utilization_percent: round1(tokens as f64 / token_limit as f64 * 100.0),
                excerpt: excerpt(chunk),
            })
            .collect())
    }
}

/// The chunk as written, cut to its first [`EXCERPT_CHARS`] characters
fn excerpt(chunk: &str) -> String {
    match chunk.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &chunk[..cut]),
        None => chunk.to_string(),
    }
}

/// Build the analysis for already-counted chunks
///
/// `token_limit` must be non-zero.
pub fn summarize(
    tokenizer: &str,
    accuracy: Accuracy,
    performance: Performance,
    counts: &[usize],
    token_limit: usize,
) -> ChunkAnalysis {
    let total_chunks = counts.len();
    let total_tokens: usize = counts.iter().sum();

    let mut token_distribution = TokenDistribution::default();
    for &tokens in counts {
        token_distribution.record(tokens, token_limit);
    }
    let over_limit = token_distribution.over_limit;

    let (avg_tokens, over_limit_percentage, efficiency_score) = if total_chunks == 0 {
        (0.0, 0.0, 0.0)
    } else {
        let n = total_chunks as f64;
        // chunks over the limit are unusable and contribute nothing
        let utilization: f64 = counts
            .iter()
            .filter(|&&tokens| tokens <= token_limit)
            .map(|&tokens| tokens as f64 / token_limit as f64)
            .sum();
        (
            round1(total_tokens as f64 / n),
            over_limit as f64 / n * 100.0,
            round1(utilization / n * 100.0),
        )
    };

    let mut analysis = ChunkAnalysis {
        tokenizer: tokenizer.to_string(),
        accuracy,
        token_limit,
        total_chunks,
        total_tokens,
        avg_tokens,
        min_tokens: counts.iter().copied().min().unwrap_or(0),
        max_tokens: counts.iter().copied().max().unwrap_or(0),
        over_limit,
        over_limit_percentage,
        token_distribution,
        efficiency_score,
        recommendations: Vec::new(),
    };
    analysis.recommendations = recommend(&analysis, performance);
    analysis
}

fn recommend(analysis: &ChunkAnalysis, performance: Performance) -> Vec<String> {
    let mut recommendations = Vec::new();
    if analysis.total_chunks == 0 {
        return recommendations;
    }

    if analysis.over_limit > 0 {
        recommendations.push(format!(
            "{} chunk(s) exceed the {}-token limit; re-split with the sentence method or a smaller custom delimiter",
            analysis.over_limit, analysis.token_limit
        ));
    }

    let short = analysis.token_distribution.under_50;
    if short * 4 > analysis.total_chunks {
        recommendations.push(format!(
            "{:.0}% of chunks are under {} tokens; consider merging short fragments",
            short as f64 / analysis.total_chunks as f64 * 100.0,
            SHORT_CHUNK_TOKENS
        ));
    }

    if analysis.efficiency_score < 50.0 && analysis.over_limit == 0 {
        recommendations.push(format!(
            "Chunks fill {:.1}% of the token limit on average; larger chunks would use it more efficiently",
            analysis.efficiency_score
        ));
    }

    if analysis.accuracy == Accuracy::Estimated && analysis.total_tokens > EXACT_TOKENIZER_HINT_TOKENS {
        recommendations.push("Consider upgrading to exact tokenizer for large datasets".to_string());
    }

    if performance == Performance::Slow && analysis.total_chunks > FAST_TOKENIZER_HINT_CHUNKS {
        recommendations.push("Large dataset detected - faster tokenizer recommended".to_string());
    }

    if recommendations.is_empty() {
        recommendations.push("Chunk sizes are well balanced for the token limit".to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use scribe_core::{DEFAULT_TOKENIZER, StaticLicense};

    fn fast(counts: &[usize], limit: usize) -> ChunkAnalysis {
        summarize("test", Accuracy::Exact, Performance::Fast, counts, limit)
    }

    #[test]
    fn test_empty_input() {
        let analysis = fast(&[], 512);
        assert_eq!(analysis.total_chunks, 0);
        assert_eq!(analysis.total_tokens, 0);
        assert_eq!(analysis.over_limit_percentage, 0.0);
        assert_eq!(analysis.min_tokens, 0);
        assert_eq!(analysis.max_tokens, 0);
        assert_eq!(analysis.efficiency_score, 0.0);
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn test_basic_statistics() {
        let analysis = fast(&[100, 200, 600], 512);
        assert_eq!(analysis.total_tokens, 900);
        assert_eq!(analysis.avg_tokens, 300.0);
        assert_eq!(analysis.min_tokens, 100);
        assert_eq!(analysis.max_tokens, 600);
        assert_eq!(analysis.over_limit, 1);
        assert!((analysis.over_limit_percentage - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(analysis.token_distribution.total(), 3);
        assert!(analysis.recommendations[0].contains("exceed the 512-token limit"));
    }

    #[test]
    fn test_efficiency_thresholds() {
        let packed = fast(&[420, 450, 500, 512], 512);
        assert!(packed.efficiency_score >= 80.0);
        assert_eq!(
            packed.recommendations,
            vec!["Chunk sizes are well balanced for the token limit"]
        );

        let sparse = fast(&[20, 30, 40], 512);
        assert!(sparse.efficiency_score < 10.0);
        assert!(sparse.recommendations.iter().any(|r| r.contains("merging short fragments")));
        assert!(sparse.recommendations.iter().any(|r| r.contains("larger chunks")));
    }

    #[test]
    fn test_over_limit_suppresses_larger_chunk_hint() {
        let analysis = fast(&[10, 2000], 512);
        assert!(analysis.efficiency_score < 50.0);
        assert!(!analysis.recommendations.iter().any(|r| r.contains("larger chunks")));
    }

    #[test]
    fn test_tokenizer_hints() {
        let estimated = summarize("gpt2", Accuracy::Estimated, Performance::Fast, &[400; 20], 512);
        assert!(estimated
            .recommendations
            .contains(&"Consider upgrading to exact tokenizer for large datasets".to_string()));

        let slow = summarize("gpt-4", Accuracy::Exact, Performance::Slow, &[400; 101], 512);
        assert!(slow
            .recommendations
            .contains(&"Large dataset detected - faster tokenizer recommended".to_string()));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let registry = TokenizerRegistry::new();
        let gate = StaticLicense::free();
        let analyzer = Analyzer::new(&registry, &gate);

        assert!(matches!(
            analyzer.analyze(&[], DEFAULT_TOKENIZER, 0),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_unknown_tokenizer_on_empty_input() {
        let registry = TokenizerRegistry::new();
        let gate = StaticLicense::free();
        let analyzer = Analyzer::new(&registry, &gate);

        assert!(matches!(
            analyzer.analyze(&[], "nope", 512),
            Err(Error::UnknownTokenizer(_))
        ));
    }

    #[test]
    fn test_preview_statuses() {
        let registry = TokenizerRegistry::new();
        let gate = StaticLicense::free();
        let analyzer = Analyzer::new(&registry, &gate);
        let chunks = vec![
            "short".to_string(),
            "word ".repeat(9),
            "word ".repeat(40),
            "and more".to_string(),
        ];

        let preview = analyzer.preview(&chunks, DEFAULT_TOKENIZER, 10, 3).unwrap();
        assert_eq!(preview.len(), 3);
        assert_eq!(preview[0].index, 1);
        assert_eq!(preview[0].status, ChunkStatus::Optimal);
        assert_eq!(preview[1].status, ChunkStatus::Good);
        assert_eq!(preview[2].status, ChunkStatus::OverLimit);
        assert_eq!(preview[2].excerpt, chunks[2]);
    }

    #[test]
    fn test_preview_excerpt_length() {
        let registry = TokenizerRegistry::new();
        let gate = StaticLicense::free();
        let analyzer = Analyzer::new(&registry, &gate);
        let medium = format!("{}\n\n{}", "a".repeat(124), "é".repeat(124));
        let long = "x".repeat(400);
        let chunks = vec![medium.clone(), long.clone()];

        let preview = analyzer.preview(&chunks, DEFAULT_TOKENIZER, 512, 10).unwrap();
        assert_eq!(medium.chars().count(), 250);
        assert_eq!(preview[0].excerpt, medium);
        assert_eq!(preview[1].excerpt, format!("{}...", &long[..300]));
        assert_eq!(preview[1].excerpt.chars().count(), 303);
    }

    proptest! {
        #[test]
        fn prop_percentages_bounded(counts in prop::collection::vec(0usize..2000, 0..60), limit in 1usize..1500) {
            let analysis = fast(&counts, limit);
            prop_assert!((0.0..=100.0).contains(&analysis.over_limit_percentage));
            prop_assert!((0.0..=100.0).contains(&analysis.efficiency_score));
            prop_assert_eq!(analysis.token_distribution.total(), counts.len());
            prop_assert_eq!(analysis.clone(), fast(&counts, limit));
        }
    }
}
