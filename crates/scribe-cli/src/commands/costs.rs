use anyhow::{Context, Result};
use scribe_config::Config;
use scribe_core::Feature;
use scribe_engine::ProcessingController;
use scribe_sources::export::{export_cost_report, render_cost_report};
use std::path::PathBuf;

use super::{Settings, load_chunks};
use crate::cli::InputArgs;

/// Options of the `costs` command beyond the shared input arguments
pub struct CostRequest {
    pub models: Vec<String>,
    pub api_usage: Option<u64>,
    pub preview: bool,
    pub output: Option<PathBuf>,
    pub json: bool,
}

pub async fn handle(
    controller: &ProcessingController,
    config: &Config,
    input: InputArgs,
    request: CostRequest,
) -> Result<()> {
    let settings = Settings::resolve(&input, config);
    let chunks = load_chunks(controller, &input, &settings).await?;

    if request.preview {
        let tokens: usize = controller
            .count_chunks(&chunks, &settings.tokenizer)?
            .iter()
            .sum();
        let band = controller.cost_preview(tokens);
        println!("Cost preview for {} tokens:", tokens);
        println!("  ${:.2} - ${:.2} ({})", band.low, band.high, band.accuracy);
        println!("  Full comparison needs a premium license (scribe license upgrade)");
        return Ok(());
    }

    if request.output.is_some() {
        controller.require(Feature::ExportReports)?;
    }

    let models = if request.models.is_empty() {
        config.cost.target_models.clone()
    } else {
        request.models
    };
    let api_usage = request.api_usage.unwrap_or(config.cost.api_usage_monthly);

    let report = controller
        .spawn_cost_analysis(
            &chunks,
            &settings.tokenizer,
            settings.token_limit,
            models,
            api_usage,
        )
        .await?;

    if let Some(path) = &request.output {
        export_cost_report(path, &report.cost_analysis)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("✓ Wrote cost report to {}", path.display());
    }

    if request.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if request.output.is_none() {
        print!("{}", render_cost_report(&report.cost_analysis));
    }

    Ok(())
}
