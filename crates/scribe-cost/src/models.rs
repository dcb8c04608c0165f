//! Pricing profiles for target models

use serde::Serialize;

use crate::ApiService;

/// What it takes to fine-tune one target model
#[derive(Debug, Clone, Serialize)]
pub struct ModelProfile {
    pub name: &'static str,
    /// Parameter count in billions
    pub params_b: f64,
    /// Weights can be downloaded and trained on rented or local hardware
    pub open_weights: bool,
    /// Hosted fine-tuning prices in USD per 1k training tokens
    pub api_prices: &'static [(ApiService, f64)],
}

impl ModelProfile {
    pub fn api_price(&self, service: ApiService) -> Option<f64> {
        self.api_prices
            .iter()
            .find(|(s, _)| *s == service)
            .map(|(_, price)| *price)
    }
}

pub fn default_models() -> Vec<ModelProfile> {
    vec![
        ModelProfile {
            name: "llama-2-7b",
            params_b: 7.0,
            open_weights: true,
            api_prices: &[(ApiService::TogetherAi, 0.00048)],
        },
        ModelProfile {
            name: "llama-2-13b",
            params_b: 13.0,
            open_weights: true,
            api_prices: &[(ApiService::TogetherAi, 0.00048)],
        },
        ModelProfile {
            name: "llama-2-70b",
            params_b: 70.0,
            open_weights: true,
            api_prices: &[(ApiService::TogetherAi, 0.0029)],
        },
        ModelProfile {
            name: "mistral-7b",
            params_b: 7.3,
            open_weights: true,
            api_prices: &[(ApiService::TogetherAi, 0.00048)],
        },
        ModelProfile {
            name: "gpt-3.5-turbo",
            params_b: 20.0,
            open_weights: false,
            api_prices: &[(ApiService::OpenAi, 0.008)],
        },
        ModelProfile {
            name: "gpt-4o-mini",
            params_b: 8.0,
            open_weights: false,
            api_prices: &[(ApiService::OpenAi, 0.003)],
        },
        ModelProfile {
            name: "claude-3-haiku",
            params_b: 20.0,
            open_weights: false,
            api_prices: &[(ApiService::Bedrock, 0.004)],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_models_have_api_pricing() {
        for model in default_models().iter().filter(|m| !m.open_weights) {
            assert!(!model.api_prices.is_empty(), "{} has no API price", model.name);
        }
    }

    #[test]
    fn test_api_price_lookup() {
        let models = default_models();
        let haiku = models.iter().find(|m| m.name == "claude-3-haiku").unwrap();
        assert_eq!(haiku.api_price(ApiService::Bedrock), Some(0.004));
        assert_eq!(haiku.api_price(ApiService::OpenAi), None);
    }
}
