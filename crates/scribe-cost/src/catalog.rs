//! Static catalog of training approaches

use scribe_core::ApproachCategory;
use serde::Serialize;

/// Fine-tuning method used on self-hosted hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingMethod {
    Full,
    Lora,
    Qlora,
}

impl TrainingMethod {
    /// VRAM needed per billion parameters, excluding activation headroom
    pub fn gb_per_b_param(&self) -> f64 {
        match self {
            Self::Full => 16.0,
            Self::Lora => 2.5,
            Self::Qlora => 0.9,
        }
    }

    /// Throughput relative to a full fine-tune on the same hardware
    pub fn speed_factor(&self) -> f64 {
        match self {
            Self::Full => 1.0,
            Self::Lora => 1.5,
            Self::Qlora => 1.1,
        }
    }
}

/// Hosted fine-tuning services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiService {
    OpenAi,
    Bedrock,
    TogetherAi,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pricing {
    SelfHosted {
        gpu_type: &'static str,
        vram_gb: u32,
        max_gpus: u32,
        /// USD per GPU-hour (electricity for local hardware)
        hourly_rate_per_gpu: f64,
        /// Full fine-tune tokens/s for a 7B model on one GPU
        base_tokens_per_sec_7b: f64,
        method: TrainingMethod,
        setup_hours: f64,
        min_billable_hours: f64,
    },
    Api {
        service: ApiService,
        tokens_per_hour: f64,
        queue_hours: f64,
    },
}

/// One way to train a model, priced independently of the dataset
#[derive(Debug, Clone, Serialize)]
pub struct Approach {
    pub name: &'static str,
    pub category: ApproachCategory,
    pub provider: &'static str,
    pub pricing: Pricing,
    pub base_confidence: f64,
}

#[allow(clippy::too_many_arguments)]
fn hosted(
    name: &'static str,
    category: ApproachCategory,
    provider: &'static str,
    gpu_type: &'static str,
    vram_gb: u32,
    max_gpus: u32,
    hourly_rate_per_gpu: f64,
    base_tokens_per_sec_7b: f64,
    method: TrainingMethod,
    base_confidence: f64,
) -> Approach {
    let setup_hours = if category == ApproachCategory::LocalGpu {
        0.1
    } else {
        0.25
    };
    Approach {
        name,
        category,
        provider,
        pricing: Pricing::SelfHosted {
            gpu_type,
            vram_gb,
            max_gpus,
            hourly_rate_per_gpu,
            base_tokens_per_sec_7b,
            method,
            setup_hours,
            min_billable_hours: 0.0,
        },
        base_confidence,
    }
}

fn api(
    name: &'static str,
    provider: &'static str,
    service: ApiService,
    tokens_per_hour: f64,
    queue_hours: f64,
    base_confidence: f64,
) -> Approach {
    Approach {
        name,
        category: ApproachCategory::ApiFineTuning,
        provider,
        pricing: Pricing::Api {
            service,
            tokens_per_hour,
            queue_hours,
        },
        base_confidence,
    }
}

/// Hourly-billed hyperscaler instances round up to a full hour
fn with_min_billable(mut approach: Approach, hours: f64) -> Approach {
    if let Pricing::SelfHosted {
        min_billable_hours, ..
    } = &mut approach.pricing
    {
        *min_billable_hours = hours;
    }
    approach
}

pub fn default_catalog() -> Vec<Approach> {
    use ApproachCategory as C;
    use TrainingMethod as M;

    vec![
        // Consumer and workstation cards only fit parameter-efficient runs
        hosted("Local RTX 3090", C::LocalGpu, "Local", "RTX 3090", 24, 1, 0.06, 900.0, M::Qlora, 0.85),
        hosted("Local RTX 4090", C::LocalGpu, "Local", "RTX 4090", 24, 1, 0.07, 1400.0, M::Qlora, 0.85),
        hosted("Local Dual RTX 4090", C::LocalGpu, "Local", "RTX 4090", 24, 2, 0.07, 1400.0, M::Lora, 0.8),
        hosted("Local RTX A6000", C::LocalGpu, "Local", "RTX A6000", 48, 1, 0.05, 1100.0, M::Lora, 0.85),
        hosted("Lambda Labs A100", C::CloudRental, "Lambda Labs", "A100 80GB", 80, 8, 1.29, 2500.0, M::Full, 0.8),
        hosted("Lambda Labs H100", C::CloudRental, "Lambda Labs", "H100 80GB", 80, 8, 2.49, 4500.0, M::Full, 0.8),
        hosted("RunPod A100", C::CloudRental, "RunPod", "A100 80GB", 80, 8, 1.64, 2500.0, M::Full, 0.8),
        hosted("RunPod RTX 4090", C::CloudRental, "RunPod", "RTX 4090", 24, 8, 0.69, 1400.0, M::Full, 0.75),
        hosted("Vast.ai RTX 3090", C::CloudRental, "Vast.ai", "RTX 3090", 24, 8, 0.22, 900.0, M::Full, 0.7),
        hosted("Vast.ai A100", C::CloudRental, "Vast.ai", "A100 80GB", 80, 8, 1.10, 2500.0, M::Full, 0.7),
        with_min_billable(
            hosted("AWS p4d A100", C::CloudRental, "AWS", "A100 40GB", 40, 8, 4.10, 2200.0, M::Full, 0.85),
            1.0,
        ),
        with_min_billable(
            hosted("GCP A100", C::CloudRental, "Google Cloud", "A100 40GB", 40, 8, 3.67, 2200.0, M::Full, 0.85),
            1.0,
        ),
        api("OpenAI Fine-tuning", "OpenAI", ApiService::OpenAi, 3_000_000.0, 0.5, 0.95),
        api("Anthropic via Bedrock", "AWS Bedrock", ApiService::Bedrock, 2_000_000.0, 1.0, 0.9),
        api("Together AI Fine-tuning", "Together AI", ApiService::TogetherAi, 5_000_000.0, 0.25, 0.9),
        hosted("LoRA on RunPod A100", C::Lora, "RunPod", "A100 80GB", 80, 4, 1.64, 2500.0, M::Lora, 0.8),
        hosted("LoRA on Lambda Labs A100", C::Lora, "Lambda Labs", "A100 80GB", 80, 4, 1.29, 2500.0, M::Lora, 0.8),
        hosted("QLoRA on RunPod RTX 4090", C::Qlora, "RunPod", "RTX 4090", 24, 4, 0.69, 1400.0, M::Qlora, 0.75),
        hosted("QLoRA on Vast.ai RTX 3090", C::Qlora, "Vast.ai", "RTX 3090", 24, 4, 0.22, 900.0, M::Qlora, 0.7),
    ]
}
