use anyhow::{Context, Result};
use scribe_config::Config;
use scribe_core::{ChunkAnalysis, Feature};
use scribe_engine::{ComparisonOutcome, ProcessingController};
use scribe_sources::ExportFormat;
use scribe_sources::export::export_chunks;
use std::path::PathBuf;

use super::{Settings, load_chunks, load_documents};
use crate::cli::InputArgs;

const COMPARE_SAMPLE_CHARS: usize = 2000;

pub async fn process(controller: &ProcessingController, config: &Config, input: InputArgs) -> Result<()> {
    let settings = Settings::resolve(&input, config);
    let documents = load_documents(controller, &input, &settings).await?;

    let total: usize = documents.iter().map(|doc| doc.chunks.len()).sum();
    println!("✓ Processed {} document(s) into {} chunks", documents.len(), total);
    println!("  Split method: {}", settings.method);
    for doc in &documents {
        println!("  {}: {} chunks", doc.path, doc.chunks.len());
    }

    Ok(())
}

pub async fn preview(
    controller: &ProcessingController,
    config: &Config,
    input: InputArgs,
    max: usize,
) -> Result<()> {
    let settings = Settings::resolve(&input, config);
    let chunks = load_chunks(controller, &input, &settings).await?;
    let previews =
        controller.preview_chunks(&chunks, &settings.tokenizer, settings.token_limit, max)?;

    println!(
        "Preview ({} of {} chunks, {} tokenizer, limit {}):",
        previews.len(),
        chunks.len(),
        settings.tokenizer,
        settings.token_limit
    );
    for item in previews {
        println!(
            "  #{:<4} {:>6} tokens  {:>6.1}%  {}",
            item.index,
            item.tokens,
            item.utilization_percent,
            item.status.label()
        );
        println!("        {}", item.excerpt);
    }

    Ok(())
}

pub async fn analyze(
    controller: &ProcessingController,
    config: &Config,
    input: InputArgs,
    json: bool,
) -> Result<()> {
    let settings = Settings::resolve(&input, config);
    let chunks = load_chunks(controller, &input, &settings).await?;
    let analysis = controller.analyze_chunks(&chunks, &settings.tokenizer, settings.token_limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let advanced = controller.require(Feature::AdvancedAnalytics).is_ok();
    print_analysis(&analysis, advanced);
    Ok(())
}

pub fn print_analysis(analysis: &ChunkAnalysis, advanced: bool) {
    let dist = &analysis.token_distribution;

    println!("Analysis ({} tokenizer, {}):", analysis.tokenizer, analysis.accuracy);
    println!("  Chunks: {}", analysis.total_chunks);
    println!("  Total tokens: {}", analysis.total_tokens);
    println!(
        "  Tokens per chunk: avg {:.1}, min {}, max {}",
        analysis.avg_tokens, analysis.min_tokens, analysis.max_tokens
    );
    println!(
        "  Over the {}-token limit: {} ({:.1}%)",
        analysis.token_limit, analysis.over_limit, analysis.over_limit_percentage
    );
    println!("  Distribution:");
    println!("    <50:        {}", dist.under_50);
    println!("    50-199:     {}", dist.from_50_to_200);
    println!("    200-399:    {}", dist.from_200_to_400);
    println!("    400-limit:  {}", dist.from_400_to_limit);
    println!("    over limit: {}", dist.over_limit);

    if advanced {
        println!("  Efficiency: {:.1}%", analysis.efficiency_score);
        if !analysis.recommendations.is_empty() {
            println!("  Recommendations:");
            for recommendation in &analysis.recommendations {
                println!("    - {}", recommendation);
            }
        }
    } else {
        println!("  Efficiency scoring and recommendations need a premium license (scribe license upgrade)");
    }
}

pub fn tokenizers(controller: &ProcessingController, json: bool) -> Result<()> {
    let tokenizers = controller.get_available_tokenizers();

    if json {
        println!("{}", serde_json::to_string_pretty(&tokenizers)?);
        return Ok(());
    }

    println!("Tokenizers:");
    for desc in tokenizers {
        let access = match (desc.available, desc.has_access) {
            (false, _) => "unavailable",
            (true, true) => "ready",
            (true, false) => "premium",
        };
        println!("  {} ({})", desc.name, desc.display_name);
        println!("    {}, {}, {}", desc.accuracy, desc.performance, access);
    }

    Ok(())
}

pub async fn compare(
    controller: &ProcessingController,
    text: Option<String>,
    file: Option<PathBuf>,
    max: usize,
) -> Result<()> {
    let sample = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => {
            let raw = controller
                .load_document(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            raw.chars().take(COMPARE_SAMPLE_CHARS).collect()
        }
        (None, None) => anyhow::bail!("Provide --text or --file"),
    };

    println!("Comparison ({} characters):", sample.chars().count());
    for result in controller.compare_tokenizers(&sample, max) {
        match result.outcome {
            ComparisonOutcome::Counted {
                count, accuracy, ..
            } => {
                let tier = if result.is_premium { ", premium" } else { "" };
                println!("  {:<16} {:>8} tokens ({}{})", result.tokenizer, count, accuracy, tier)
            }
            ComparisonOutcome::Failed { reason } => {
                println!("  {:<16} {:>8}  {}", result.tokenizer, "-", reason)
            }
        }
    }

    Ok(())
}

pub async fn export(
    controller: &ProcessingController,
    config: &Config,
    input: InputArgs,
    output: PathBuf,
    format: Option<String>,
    with_counts: bool,
) -> Result<()> {
    let format = match format {
        Some(name) => name.parse::<ExportFormat>()?,
        None => ExportFormat::from_path(&output).unwrap_or(ExportFormat::Txt),
    };

    let settings = Settings::resolve(&input, config);
    let chunks = load_chunks(controller, &input, &settings).await?;
    let counts = if with_counts {
        Some(controller.count_chunks(&chunks, &settings.tokenizer)?)
    } else {
        None
    };

    export_chunks(&output, format, &chunks, counts.as_deref())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("✓ Exported {} chunks to {}", chunks.len(), output.display());
    println!("  Format: {}", format.as_str());
    Ok(())
}
