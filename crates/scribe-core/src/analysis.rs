//! Dataset-level chunk statistics

use serde::{Deserialize, Serialize};

use crate::Accuracy;

/// Histogram of per-chunk token counts
///
/// Buckets are disjoint: a chunk above the token limit is only counted in
/// `over_limit`, whatever its size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDistribution {
    pub under_50: usize,
    #[serde(rename = "50_200")]
    pub from_50_to_200: usize,
    #[serde(rename = "200_400")]
    pub from_200_to_400: usize,
    #[serde(rename = "400_limit")]
    pub from_400_to_limit: usize,
    pub over_limit: usize,
}

impl TokenDistribution {
    pub fn record(&mut self, tokens: usize, token_limit: usize) {
        if tokens > token_limit {
            self.over_limit += 1;
        } else if tokens < 50 {
            self.under_50 += 1;
        } else if tokens < 200 {
            self.from_50_to_200 += 1;
        } else if tokens < 400 {
            self.from_200_to_400 += 1;
        } else {
            self.from_400_to_limit += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.under_50
            + self.from_50_to_200
            + self.from_200_to_400
            + self.from_400_to_limit
            + self.over_limit
    }
}

/// Aggregate statistics for one chunk sequence under one tokenizer
///
/// Always rebuilt from scratch; a tokenizer or chunk change produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkAnalysis {
    pub tokenizer: String,
    pub accuracy: Accuracy,
    pub token_limit: usize,
    pub total_chunks: usize,
    pub total_tokens: usize,
    pub avg_tokens: f64,
    pub min_tokens: usize,
    pub max_tokens: usize,
    pub over_limit: usize,
    pub over_limit_percentage: f64,
    pub token_distribution: TokenDistribution,
    pub efficiency_score: f64,
    pub recommendations: Vec<String>,
}

/// Fit of a single chunk against the token limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStatus {
    /// At most 80% of the limit
    Optimal,
    /// Within the limit
    Good,
    OverLimit,
}

impl ChunkStatus {
    pub fn classify(tokens: usize, token_limit: usize) -> Self {
        if tokens * 10 <= token_limit * 8 {
            Self::Optimal
        } else if tokens <= token_limit {
            Self::Good
        } else {
            Self::OverLimit
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Optimal => "OPTIMAL",
            Self::Good => "GOOD",
            Self::OverLimit => "OVER LIMIT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPreview {
    /// 1-based position in the chunk sequence
    pub index: usize,
    pub tokens: usize,
    pub status: ChunkStatus,
    pub utilization_percent: f64,
    pub excerpt: String,
}
