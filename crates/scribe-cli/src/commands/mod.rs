pub mod config;
pub mod costs;
pub mod license;
pub mod process;
pub mod session;

use anyhow::{Context, Result};
use scribe_config::Config;
use scribe_core::{CleanOptions, FileConfig, SplitMethod};
use scribe_engine::ProcessingController;

use crate::cli::InputArgs;

/// Processing settings after applying command-line overrides to the config
#[derive(Debug, Clone)]
pub struct Settings {
    pub method: SplitMethod,
    pub delimiter: Option<String>,
    pub clean: CleanOptions,
    pub tokenizer: String,
    pub token_limit: usize,
}

impl Settings {
    pub fn resolve(args: &InputArgs, config: &Config) -> Self {
        Self {
            method: args.method.unwrap_or(config.split.method),
            delimiter: args
                .delimiter
                .clone()
                .or_else(|| config.split.delimiter.clone()),
            clean: if args.no_clean {
                CleanOptions::none()
            } else {
                config.clean
            },
            tokenizer: args
                .tokenizer
                .clone()
                .unwrap_or_else(|| config.default_tokenizer.clone()),
            token_limit: args.limit.unwrap_or(config.token_limit),
        }
    }

    pub fn file_config(&self) -> FileConfig {
        FileConfig {
            tokenizer: self.tokenizer.clone(),
            split_method: self.method,
            delimiter: self.delimiter.clone(),
            clean: self.clean,
        }
    }
}

/// Chunks for one input document
pub struct Document {
    pub path: String,
    pub chunks: Vec<String>,
}

/// Expand the inputs and chunk every matching document, in path order
pub async fn load_documents(
    controller: &ProcessingController,
    args: &InputArgs,
    settings: &Settings,
) -> Result<Vec<Document>> {
    let paths = scribe_sources::expand_inputs(&args.inputs)?;
    if paths.is_empty() {
        anyhow::bail!("No documents matched {}", args.inputs.join(", "));
    }

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let chunks = controller
            .process_book(
                &path,
                &settings.clean,
                settings.method,
                settings.delimiter.as_deref(),
            )
            .await
            .with_context(|| format!("Failed to process {}", path.display()))?;
        tracing::debug!(path = %path.display(), chunks = chunks.len(), "Loaded document");
        documents.push(Document {
            path: path.display().to_string(),
            chunks,
        });
    }
    Ok(documents)
}

/// All chunks of all inputs, concatenated in path order
pub async fn load_chunks(
    controller: &ProcessingController,
    args: &InputArgs,
    settings: &Settings,
) -> Result<Vec<String>> {
    Ok(load_documents(controller, args, settings)
        .await?
        .into_iter()
        .flat_map(|doc| doc.chunks)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> InputArgs {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            input: InputArgs,
        }

        let argv = ["scribe", "book.txt"].iter().chain(extra).copied();
        Wrapper::parse_from(argv).input
    }

    #[test]
    fn test_settings_fall_back_to_config() {
        let config = Config::default();
        let settings = Settings::resolve(&args(&[]), &config);

        assert_eq!(settings.method, SplitMethod::Paragraph);
        assert_eq!(settings.tokenizer, "gpt2");
        assert_eq!(settings.token_limit, 512);
        assert_eq!(settings.clean, CleanOptions::default());
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config::default();
        let settings = Settings::resolve(
            &args(&[
                "--method", "custom", "--delimiter", "###", "--no-clean", "--tokenizer", "gpt-4",
                "--limit", "1024",
            ]),
            &config,
        );

        assert_eq!(settings.method, SplitMethod::Custom);
        assert_eq!(settings.delimiter.as_deref(), Some("###"));
        assert_eq!(settings.clean, CleanOptions::none());
        assert_eq!(settings.tokenizer, "gpt-4");
        assert_eq!(settings.token_limit, 1024);
        assert_eq!(settings.file_config().split_method, SplitMethod::Custom);
    }

    #[tokio::test]
    async fn test_load_chunks_from_glob() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "One.\n\nTwo.").unwrap();
        std::fs::write(dir.path().join("b.txt"), "Three.").unwrap();

        let pattern = dir.path().join("*.txt").display().to_string();
        let input = args(&[]);
        let input = InputArgs {
            inputs: vec![pattern],
            ..input
        };
        let controller = ProcessingController::new(Box::new(scribe_core::StaticLicense::free()));
        let settings = Settings::resolve(&input, &Config::default());

        let chunks = load_chunks(&controller, &input, &settings).await.unwrap();
        assert_eq!(chunks, vec!["One.", "Two.", "Three."]);
    }
}
