use std::collections::BTreeMap;

use scribe_core::{
    BestOption, CostAnalysisResult, CostEstimate, CostPreview, CostRange, CostSummary, Error,
    HardwareRequirements, ModelCosts, Result, RoiProjection,
};

use crate::{Approach, ModelProfile, Pricing, default_catalog, default_models};

pub const DEFAULT_EPOCHS: u32 = 3;

const ACTIVATION_HEADROOM_GB: f64 = 2.0;
/// Per extra GPU, applied multiplicatively
const SCALING_EFFICIENCY: f64 = 0.9;
/// Training volume (tokens × epochs) the price model is calibrated for
const CALIBRATED_VOLUME: (f64, f64) = (100_000.0, 50_000_000.0);
const CONFIDENCE_DECAY_PER_DECADE: f64 = 0.15;
const MIN_VOLUME_FACTOR: f64 = 0.3;
const LOW_CONFIDENCE: f64 = 0.6;
/// Inference API price the ROI projection compares against, USD per 1k tokens
const REFERENCE_API_PRICE_PER_1K: f64 = 0.03;
const SELF_HOSTED_SAVINGS_RATE: f64 = 0.9;
const PREVIEW_PRICE_PER_1K: f64 = 0.008;

/// Prices a dataset against every catalog approach for a set of target models
///
/// Cheap to clone, so callers can move a copy onto a blocking task.
#[derive(Debug, Clone)]
pub struct CostEstimator {
    approaches: Vec<Approach>,
    models: Vec<ModelProfile>,
    epochs: u32,
}

impl CostEstimator {
    pub fn new() -> Self {
        Self {
            approaches: default_catalog(),
            models: default_models(),
            epochs: DEFAULT_EPOCHS,
        }
    }

    pub fn with_epochs(mut self, epochs: u32) -> Self {
        self.epochs = epochs.max(1);
        self
    }

    pub fn approaches(&self) -> &[Approach] {
        &self.approaches
    }

    pub fn models(&self) -> &[ModelProfile] {
        &self.models
    }

    /// Tokens processed over the whole training run
    pub fn training_volume(&self, total_tokens: usize) -> f64 {
        total_tokens as f64 * self.epochs as f64
    }

    /// Full cost analysis across `target_models`
    ///
    /// Models without a pricing profile get an error marker; the others are
    /// still priced.
    pub fn estimate<S: AsRef<str>>(
        &self,
        total_tokens: usize,
        target_models: &[S],
        api_usage_monthly: u64,
    ) -> Result<CostAnalysisResult> {
        if target_models.is_empty() {
            return Err(Error::InvalidConfiguration(
                "At least one target model is required".to_string(),
            ));
        }

        let volume = self.training_volume(total_tokens);
        let mut detailed_results: BTreeMap<String, ModelCosts> = BTreeMap::new();

        for model in target_models {
            let model: &str = model.as_ref();
            if detailed_results.contains_key(model) {
                continue;
            }
            let outcome = match self.models.iter().find(|p| p.name == model) {
                None => ModelCosts::Error {
                    error: format!("No pricing data for model {}", model),
                },
                Some(profile) => {
                    let cost_estimates = self.estimate_model(profile, volume);
                    tracing::debug!(model, approaches = cost_estimates.len(), "Priced model");
                    if cost_estimates.is_empty() {
                        ModelCosts::Error {
                            error: format!("No feasible training approach for model {}", model),
                        }
                    } else {
                        ModelCosts::Ready { cost_estimates }
                    }
                }
            };
            detailed_results.insert(model.to_string(), outcome);
        }

        let mut ranked: Vec<CostEstimate> = detailed_results
            .values()
            .flat_map(|costs| costs.estimates().iter().cloned())
            .collect();
        ranked.sort_by(CostEstimate::rank_cmp);

        let summary = summarize(&ranked, &detailed_results);
        let roi = summary
            .best_overall
            .as_ref()
            .and_then(|best| roi_projection(best.cost, api_usage_monthly));
        let recommendations = recommend(&ranked, &detailed_results, roi.as_ref());

        Ok(CostAnalysisResult {
            dataset_tokens: total_tokens,
            summary,
            detailed_results,
            ranked,
            roi,
            recommendations,
        })
    }

    /// Rough band for the free tier, without consulting the catalog
    pub fn preview(&self, total_tokens: usize) -> CostPreview {
        let mid = self.training_volume(total_tokens) / 1000.0 * PREVIEW_PRICE_PER_1K;
        CostPreview {
            low: mid * 0.5,
            high: mid * 1.5,
            accuracy: "±50%".to_string(),
        }
    }

    fn estimate_model(&self, profile: &ModelProfile, volume: f64) -> Vec<CostEstimate> {
        let mut estimates: Vec<CostEstimate> = self
            .approaches
            .iter()
            .filter_map(|approach| price(approach, profile, volume))
            .collect();
        estimates.sort_by(CostEstimate::rank_cmp);

        let snapshot = estimates.clone();
        for estimate in &mut estimates {
            estimate.dominated_by = snapshot
                .iter()
                .find(|other| estimate.is_dominated_by(other))
                .map(|other| other.approach_name.clone());
        }
        estimates
    }
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Price one approach for one model, or `None` when it cannot train it
fn price(approach: &Approach, profile: &ModelProfile, volume: f64) -> Option<CostEstimate> {
    let (total_cost_usd, training_hours, hardware_requirements) = match approach.pricing {
        Pricing::SelfHosted {
            gpu_type,
            vram_gb,
            max_gpus,
            hourly_rate_per_gpu,
            base_tokens_per_sec_7b,
            method,
            setup_hours,
            min_billable_hours,
        } => {
            if !profile.open_weights {
                return None;
            }
            let required_gb = profile.params_b * method.gb_per_b_param() + ACTIVATION_HEADROOM_GB;
            let gpu_count = ((required_gb / vram_gb as f64).ceil() as u32).max(1);
            if gpu_count > max_gpus {
                return None;
            }

            let scaling = SCALING_EFFICIENCY.powi(gpu_count as i32 - 1);
            let throughput = base_tokens_per_sec_7b
                * (7.0 / profile.params_b)
                * method.speed_factor()
                * gpu_count as f64
                * scaling;
            let hours = (volume / throughput / 3600.0 + setup_hours).max(min_billable_hours);
            let cost = hours * hourly_rate_per_gpu * gpu_count as f64;

            let hardware = HardwareRequirements {
                gpu_type: gpu_type.to_string(),
                gpu_count,
                vram_gb_per_gpu: vram_gb,
            };
            (cost, hours, hardware)
        }
        Pricing::Api {
            service,
            tokens_per_hour,
            queue_hours,
        } => {
            let price_per_1k = profile.api_price(service)?;
            let hardware = HardwareRequirements {
                gpu_type: "Managed".to_string(),
                gpu_count: 0,
                vram_gb_per_gpu: 0,
            };
            (
                volume / 1000.0 * price_per_1k,
                volume / tokens_per_hour + queue_hours,
                hardware,
            )
        }
    };

    Some(CostEstimate {
        approach_name: approach.name.to_string(),
        category: approach.category,
        provider: approach.provider.to_string(),
        target_model: profile.name.to_string(),
        total_cost_usd,
        training_hours,
        hardware_requirements,
        confidence: (approach.base_confidence * volume_factor(volume)).clamp(0.05, 0.99),
        dominated_by: None,
    })
}

/// 1.0 inside the calibrated range, decaying per decade outside it
fn volume_factor(volume: f64) -> f64 {
    let (low, high) = CALIBRATED_VOLUME;
    let decades = if volume < low {
        (low / volume.max(1.0)).log10()
    } else if volume > high {
        (volume / high).log10()
    } else {
        0.0
    };
    (1.0 - CONFIDENCE_DECAY_PER_DECADE * decades).max(MIN_VOLUME_FACTOR)
}

fn summarize(ranked: &[CostEstimate], detailed: &BTreeMap<String, ModelCosts>) -> CostSummary {
    let best_overall = ranked.first().map(|best| BestOption {
        approach_name: best.approach_name.clone(),
        target_model: best.target_model.clone(),
        cost: best.total_cost_usd,
        hours: best.training_hours,
    });
    let cost_range = match (ranked.first(), ranked.last()) {
        (Some(first), Some(last)) => Some(CostRange {
            min: first.total_cost_usd,
            max: last.total_cost_usd,
        }),
        _ => None,
    };

    CostSummary {
        best_overall,
        cost_range,
        models_compared: detailed.values().filter(|c| !c.estimates().is_empty()).count(),
    }
}

fn roi_projection(best_cost: f64, api_usage_monthly: u64) -> Option<RoiProjection> {
    if api_usage_monthly == 0 {
        return None;
    }
    let monthly_api_cost = api_usage_monthly as f64 / 1000.0 * REFERENCE_API_PRICE_PER_1K;
    let monthly_savings = monthly_api_cost * SELF_HOSTED_SAVINGS_RATE;

    Some(RoiProjection {
        monthly_api_usage_tokens: api_usage_monthly,
        monthly_api_cost,
        monthly_savings,
        break_even_months: best_cost / monthly_savings,
        annual_savings: monthly_savings * 12.0 - best_cost,
    })
}

fn recommend(
    ranked: &[CostEstimate],
    detailed: &BTreeMap<String, ModelCosts>,
    roi: Option<&RoiProjection>,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if let (Some(best), Some(worst)) = (ranked.first(), ranked.last()) {
        if ranked.len() > 1 {
            recommendations.push(format!(
                "Cheapest option: {} for {} at ${:.2}, saving ${:.2} over {} (${:.2})",
                best.approach_name,
                best.target_model,
                best.total_cost_usd,
                worst.total_cost_usd - best.total_cost_usd,
                worst.approach_name,
                worst.total_cost_usd
            ));
        } else {
            recommendations.push(format!(
                "Only option: {} for {} at ${:.2}",
                best.approach_name, best.target_model, best.total_cost_usd
            ));
        }

        if best.category.is_parameter_efficient() {
            recommendations.push(format!(
                "Parameter-efficient fine-tuning ({}) is the most cost-effective approach for this dataset",
                best.category
            ));
        }
        if best.confidence < LOW_CONFIDENCE {
            recommendations.push(format!(
                "Low confidence estimate ({:.0}%): dataset size is outside the calibrated range",
                best.confidence * 100.0
            ));
        }
    }

    for (model, costs) in detailed {
        match costs {
            ModelCosts::Ready { cost_estimates } => {
                let dominated: Vec<&str> = cost_estimates
                    .iter()
                    .filter(|e| e.dominated_by.is_some())
                    .map(|e| e.approach_name.as_str())
                    .collect();
                if !dominated.is_empty() {
                    recommendations.push(format!(
                        "{}: {} approach(es) are beaten on both cost and time ({})",
                        model,
                        dominated.len(),
                        dominated.join(", ")
                    ));
                }
            }
            ModelCosts::Error { error } => {
                recommendations.push(format!("{}: {}", model, error));
            }
        }
    }

    if let Some(roi) = roi {
        recommendations.push(format!(
            "Fine-tuning pays for itself after {:.1} months against ${:.2}/month of API usage",
            roi.break_even_months, roi.monthly_api_cost
        ));
    }

    recommendations
}
