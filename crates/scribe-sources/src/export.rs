//! Chunk and cost report exporters

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use scribe_core::CostAnalysisResult;
use serde::Serialize;
use thiserror::Error;

pub type ExportResult<T> = std::result::Result<T, ExportError>;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Csv,
    Json,
    /// One `{"text": ...}` object per line, the usual fine-tuning input
    Jsonl,
}

impl ExportFormat {
    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Jsonl => "jsonl",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> ExportResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Txt),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "jsonl" => Ok(Self::Jsonl),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Serialize)]
struct ChunkRecord<'a> {
    index: usize,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_count: Option<usize>,
}

#[derive(Serialize)]
struct TrainingRecord<'a> {
    text: &'a str,
}

fn count_at(token_counts: Option<&[usize]>, index: usize) -> Option<usize> {
    token_counts.and_then(|counts| counts.get(index).copied())
}

/// Chunks separated by a blank line
pub fn write_txt<W: Write>(mut writer: W, chunks: &[String]) -> ExportResult<()> {
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 {
            writer.write_all(b"\n\n")?;
        }
        writer.write_all(chunk.as_bytes())?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// `chunk_index,text[,token_count]`
pub fn write_csv<W: Write>(
    writer: W,
    chunks: &[String],
    token_counts: Option<&[usize]>,
) -> ExportResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    if token_counts.is_some() {
        csv.write_record(["chunk_index", "text", "token_count"])?;
    } else {
        csv.write_record(["chunk_index", "text"])?;
    }

    for (i, chunk) in chunks.iter().enumerate() {
        let index = i.to_string();
        match count_at(token_counts, i) {
            Some(count) => {
                csv.write_record([index.as_str(), chunk.as_str(), count.to_string().as_str()])?
            }
            None if token_counts.is_some() => csv.write_record([index.as_str(), chunk.as_str(), ""])?,
            None => csv.write_record([index.as_str(), chunk.as_str()])?,
        }
    }

    csv.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(
    writer: W,
    chunks: &[String],
    token_counts: Option<&[usize]>,
) -> ExportResult<()> {
    let records: Vec<ChunkRecord> = chunks
        .iter()
        .enumerate()
        .map(|(index, text)| ChunkRecord {
            index,
            text,
            token_count: count_at(token_counts, index),
        })
        .collect();
    serde_json::to_writer_pretty(writer, &records)?;
    Ok(())
}

pub fn write_jsonl<W: Write>(mut writer: W, chunks: &[String]) -> ExportResult<()> {
    for chunk in chunks {
        serde_json::to_writer(&mut writer, &TrainingRecord { text: chunk })?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write chunks to `path` in `format`
pub fn export_chunks(
    path: &Path,
    format: ExportFormat,
    chunks: &[String],
    token_counts: Option<&[usize]>,
) -> ExportResult<()> {
    let writer = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Txt => write_txt(writer, chunks)?,
        ExportFormat::Csv => write_csv(writer, chunks, token_counts)?,
        ExportFormat::Json => write_json(writer, chunks, token_counts)?,
        ExportFormat::Jsonl => write_jsonl(writer, chunks)?,
    }
    tracing::info!(path = %path.display(), format = format.as_str(), chunks = chunks.len(), "Exported chunks");
    Ok(())
}

pub fn write_cost_json<W: Write>(writer: W, result: &CostAnalysisResult) -> ExportResult<()> {
    serde_json::to_writer_pretty(writer, result)?;
    Ok(())
}

/// One row per ranked estimate
pub fn write_cost_csv<W: Write>(writer: W, result: &CostAnalysisResult) -> ExportResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "Model",
        "Approach",
        "Cost_USD",
        "Time_Hours",
        "Hardware",
        "Confidence",
    ])?;

    for estimate in &result.ranked {
        csv.write_record([
            estimate.target_model.clone(),
            estimate.approach_name.clone(),
            format!("{:.2}", estimate.total_cost_usd),
            format!("{:.2}", estimate.training_hours),
            estimate.hardware_requirements.to_string(),
            format!("{:.2}", estimate.confidence),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Human-readable summary: headline numbers, top 10 approaches, top 5 recommendations
pub fn render_cost_report(result: &CostAnalysisResult) -> String {
    let mut out = String::new();
    let summary = &result.summary;

    let _ = writeln!(out, "Training Cost Analysis");
    let _ = writeln!(out, "======================");
    let _ = writeln!(out, "Dataset tokens:  {}", result.dataset_tokens);
    let _ = writeln!(out, "Models compared: {}", summary.models_compared);
    if let Some(best) = &summary.best_overall {
        let _ = writeln!(
            out,
            "Best option:     {} ({}) ${:.2}, {:.1} hours",
            best.approach_name, best.target_model, best.cost, best.hours
        );
    }
    if let Some(range) = &summary.cost_range {
        let _ = writeln!(
            out,
            "Cost range:      ${:.2} - ${:.2} (save ${:.2})",
            range.min,
            range.max,
            range.savings()
        );
    }

    if !result.ranked.is_empty() {
        let _ = writeln!(out, "\nTop approaches:");
        for (i, estimate) in result.ranked.iter().take(10).enumerate() {
            let _ = writeln!(
                out,
                "{:>2}. {:<28} {:<15} ${:>10.2} {:>8.1}h  {:<16} {:>3.0}%",
                i + 1,
                estimate.approach_name,
                estimate.target_model,
                estimate.total_cost_usd,
                estimate.training_hours,
                estimate.hardware_requirements.to_string(),
                estimate.confidence * 100.0
            );
        }
    }

    if let Some(roi) = &result.roi {
        let _ = writeln!(
            out,
            "\nROI: ${:.2}/month API spend, ${:.2}/month saved, break-even in {:.1} months, ${:.2} saved in the first year",
            roi.monthly_api_cost, roi.monthly_savings, roi.break_even_months, roi.annual_savings
        );
    }

    if !result.recommendations.is_empty() {
        let _ = writeln!(out, "\nRecommendations:");
        for recommendation in result.recommendations.iter().take(5) {
            let _ = writeln!(out, "  - {}", recommendation);
        }
    }

    out
}

/// Write a cost report, choosing JSON, CSV or text from the extension
pub fn export_cost_report(path: &Path, result: &CostAnalysisResult) -> ExportResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    match ExportFormat::from_path(path) {
        Some(ExportFormat::Json) => write_cost_json(writer, result)?,
        Some(ExportFormat::Csv) => write_cost_csv(writer, result)?,
        _ => {
            writer.write_all(render_cost_report(result).as_bytes())?;
            writer.flush()?;
        }
    }
    tracing::info!(path = %path.display(), "Exported cost report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::{
        ApproachCategory, BestOption, CostEstimate, CostRange, CostSummary, HardwareRequirements,
        ModelCosts,
    };
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn chunks() -> Vec<String> {
        vec!["First, chunk".to_string(), "Second \"quoted\"\nchunk".to_string()]
    }

    fn cost_result(estimates: usize) -> CostAnalysisResult {
        let ranked: Vec<CostEstimate> = (0..estimates)
            .map(|i| CostEstimate {
                approach_name: format!("Approach {}", i),
                category: ApproachCategory::CloudRental,
                provider: "Provider".to_string(),
                target_model: "llama-2-7b".to_string(),
                total_cost_usd: 10.0 + i as f64,
                training_hours: 2.0,
                hardware_requirements: HardwareRequirements {
                    gpu_type: "A100 80GB".to_string(),
                    gpu_count: 2,
                    vram_gb_per_gpu: 80,
                },
                confidence: 0.8,
                dominated_by: None,
            })
            .collect();

        let mut detailed_results = BTreeMap::new();
        detailed_results.insert(
            "llama-2-7b".to_string(),
            ModelCosts::Ready {
                cost_estimates: ranked.clone(),
            },
        );

        CostAnalysisResult {
            dataset_tokens: 123_456,
            summary: CostSummary {
                best_overall: Some(BestOption {
                    approach_name: "Approach 0".to_string(),
                    target_model: "llama-2-7b".to_string(),
                    cost: 10.0,
                    hours: 2.0,
                }),
                cost_range: Some(CostRange {
                    min: 10.0,
                    max: 10.0 + estimates.saturating_sub(1) as f64,
                }),
                models_compared: 1,
            },
            detailed_results,
            ranked,
            roi: None,
            recommendations: (0..8).map(|i| format!("tip {}", i)).collect(),
        }
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out.JSONL")), Some(ExportFormat::Jsonl));
        assert_eq!(ExportFormat::from_path(Path::new("out.csv")), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_path(Path::new("out")), None);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_write_txt() {
        let mut buf = Vec::new();
        write_txt(&mut buf, &chunks()).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "First, chunk\n\nSecond \"quoted\"\nchunk\n"
        );
    }

    #[test]
    fn test_write_csv_quotes_and_counts() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &chunks(), Some(&[3, 5][..])).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), ["chunk_index", "text", "token_count"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[1][1], "Second \"quoted\"\nchunk");
        assert_eq!(&rows[1][2], "5");
    }

    #[test]
    fn test_write_csv_without_counts() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &chunks(), None).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("chunk_index,text\n"));
    }

    #[test]
    fn test_write_json_and_jsonl() {
        let mut json = Vec::new();
        write_json(&mut json, &chunks(), None).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value[1]["index"], 1);
        assert!(value[0].get("token_count").is_none());

        let mut jsonl = Vec::new();
        write_jsonl(&mut jsonl, &chunks()).unwrap();
        let text = String::from_utf8(jsonl).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["text"], "Second \"quoted\"\nchunk");
    }

    #[test]
    fn test_export_chunks_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chunks.jsonl");
        let format = ExportFormat::from_path(&path).unwrap();

        export_chunks(&path, format, &chunks(), None).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 2);
    }

    #[test]
    fn test_cost_csv_columns() {
        let mut buf = Vec::new();
        write_cost_csv(&mut buf, &cost_result(2)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("Model,Approach,Cost_USD,Time_Hours,Hardware,Confidence")
        );
        assert_eq!(lines.next(), Some("llama-2-7b,Approach 0,10.00,2.00,A100 80GB x2,0.80"));
    }

    #[test]
    fn test_report_limits_sections() {
        let report = render_cost_report(&cost_result(12));

        assert!(report.contains("Approach 9 "));
        assert!(!report.contains("Approach 10 "));
        assert!(report.contains("tip 4"));
        assert!(!report.contains("tip 5"));
    }

    #[test]
    fn test_export_cost_report_by_extension() {
        let dir = TempDir::new().unwrap();
        let result = cost_result(3);

        let json = dir.path().join("costs.json");
        export_cost_report(&json, &result).unwrap();
        let parsed: CostAnalysisResult =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(parsed, result);

        let txt = dir.path().join("costs.txt");
        export_cost_report(&txt, &result).unwrap();
        assert!(std::fs::read_to_string(&txt).unwrap().starts_with("Training Cost Analysis"));
    }
}
