mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::Commands;
use scribe_config::Config;
use scribe_engine::ProcessingController;
use scribe_storage::FileLicense;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;

    // The license file is re-read on every invocation
    let license = FileLicense::open_default()?;
    let mut controller = ProcessingController::new(Box::new(license));

    match cli.command {
        Commands::Process { input } => commands::process::process(&controller, &config, input).await,
        Commands::Preview { input, max } => {
            commands::process::preview(&controller, &config, input, max).await
        }
        Commands::Analyze { input, json } => {
            commands::process::analyze(&controller, &config, input, json).await
        }
        Commands::Tokenizers { json } => commands::process::tokenizers(&controller, json),
        Commands::Compare { text, file, max } => {
            commands::process::compare(&controller, text, file, max).await
        }
        Commands::Costs {
            input,
            models,
            api_usage,
            preview,
            output,
            json,
        } => {
            let request = commands::costs::CostRequest {
                models,
                api_usage,
                preview,
                output,
                json,
            };
            commands::costs::handle(&controller, &config, input, request).await
        }
        Commands::Export {
            input,
            output,
            format,
            with_counts,
        } => {
            commands::process::export(&controller, &config, input, output, format, with_counts)
                .await
        }
        Commands::Session(cmd) => commands::session::handle(cmd, &controller, &config).await,
        Commands::License(cmd) => commands::license::handle(cmd, &mut controller),
        Commands::Config(cmd) => commands::config::handle(cmd, &config),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut cli::Cli::command(), "scribe", &mut std::io::stdout());
            Ok(())
        }
    }
}
