//! Training cost estimates and analysis snapshots

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApproachCategory {
    LocalGpu,
    CloudRental,
    ApiFineTuning,
    Lora,
    Qlora,
}

impl ApproachCategory {
    pub fn is_parameter_efficient(&self) -> bool {
        matches!(self, Self::Lora | Self::Qlora)
    }
}

impl fmt::Display for ApproachCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LocalGpu => "local GPU",
            Self::CloudRental => "cloud rental",
            Self::ApiFineTuning => "API fine-tuning",
            Self::Lora => "LoRA",
            Self::Qlora => "QLoRA",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareRequirements {
    pub gpu_type: String,
    pub gpu_count: u32,
    pub vram_gb_per_gpu: u32,
}

impl fmt::Display for HardwareRequirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.gpu_count > 1 {
            write!(f, "{} x{}", self.gpu_type, self.gpu_count)
        } else {
            f.write_str(&self.gpu_type)
        }
    }
}

/// Projected cost of training one target model with one approach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub approach_name: String,
    pub category: ApproachCategory,
    pub provider: String,
    pub target_model: String,
    pub total_cost_usd: f64,
    pub training_hours: f64,
    pub hardware_requirements: HardwareRequirements,
    /// How well calibrated the cost model is for this dataset size, in 0..=1
    pub confidence: f64,
    /// Approach that is at least as cheap and as fast for the same model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominated_by: Option<String>,
}

impl CostEstimate {
    /// Ranking order: cost, then hours, then names for a total order
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.total_cost_usd
            .total_cmp(&other.total_cost_usd)
            .then_with(|| self.training_hours.total_cmp(&other.training_hours))
            .then_with(|| self.approach_name.cmp(&other.approach_name))
            .then_with(|| self.target_model.cmp(&other.target_model))
    }

    /// True when `other` is no worse on cost and time and strictly better on one
    pub fn is_dominated_by(&self, other: &Self) -> bool {
        other.total_cost_usd <= self.total_cost_usd
            && other.training_hours <= self.training_hours
            && (other.total_cost_usd < self.total_cost_usd
                || other.training_hours < self.training_hours)
    }
}

/// Per-model outcome; a model without pricing data carries an error marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelCosts {
    Ready { cost_estimates: Vec<CostEstimate> },
    Error { error: String },
}

impl ModelCosts {
    pub fn estimates(&self) -> &[CostEstimate] {
        match self {
            Self::Ready { cost_estimates } => cost_estimates,
            Self::Error { .. } => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Ready { .. } => None,
            Self::Error { error } => Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestOption {
    pub approach_name: String,
    pub target_model: String,
    pub cost: f64,
    pub hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: f64,
    pub max: f64,
}

impl CostRange {
    pub fn savings(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CostSummary {
    pub best_overall: Option<BestOption>,
    pub cost_range: Option<CostRange>,
    pub models_compared: usize,
}

/// Break-even projection against ongoing API usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiProjection {
    pub monthly_api_usage_tokens: u64,
    pub monthly_api_cost: f64,
    pub monthly_savings: f64,
    pub break_even_months: f64,
    pub annual_savings: f64,
}

/// Complete, read-only result of one cost estimation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAnalysisResult {
    pub dataset_tokens: usize,
    pub summary: CostSummary,
    pub detailed_results: BTreeMap<String, ModelCosts>,
    /// Every estimate across all models, cheapest first
    pub ranked: Vec<CostEstimate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi: Option<RoiProjection>,
    pub recommendations: Vec<String>,
}

/// Rough free-tier cost band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostPreview {
    pub low: f64,
    pub high: f64,
    pub accuracy: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(name: &str, cost: f64, hours: f64) -> CostEstimate {
        CostEstimate {
            approach_name: name.to_string(),
            category: ApproachCategory::CloudRental,
            provider: "test".to_string(),
            target_model: "llama-2-7b".to_string(),
            total_cost_usd: cost,
            training_hours: hours,
            hardware_requirements: HardwareRequirements {
                gpu_type: "A100 80GB".to_string(),
                gpu_count: 2,
                vram_gb_per_gpu: 80,
            },
            confidence: 0.8,
            dominated_by: None,
        }
    }

    #[test]
    fn test_rank_cmp_breaks_ties_by_hours() {
        let a = estimate("a", 10.0, 2.0);
        let b = estimate("b", 10.0, 1.0);
        assert_eq!(a.rank_cmp(&b), Ordering::Greater);
        assert_eq!(estimate("c", 5.0, 9.0).rank_cmp(&b), Ordering::Less);
    }

    #[test]
    fn test_dominance() {
        let slow_expensive = estimate("a", 10.0, 5.0);
        let fast_cheap = estimate("b", 8.0, 5.0);
        let identical = estimate("c", 10.0, 5.0);
        assert!(slow_expensive.is_dominated_by(&fast_cheap));
        assert!(!fast_cheap.is_dominated_by(&slow_expensive));
        assert!(!slow_expensive.is_dominated_by(&identical));
    }

    #[test]
    fn test_hardware_display() {
        let hw = estimate("a", 1.0, 1.0).hardware_requirements;
        assert_eq!(hw.to_string(), "A100 80GB x2");
    }

    #[test]
    fn test_model_costs_error_marker_serde() {
        let marker = ModelCosts::Error {
            error: "No pricing data".to_string(),
        };
        let json = serde_json::to_value(&marker).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "No pricing data");
        assert!(marker.estimates().is_empty());
    }
}
