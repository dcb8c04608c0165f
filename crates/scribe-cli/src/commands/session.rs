use anyhow::{Context, Result};
use scribe_config::Config;
use scribe_core::{Feature, Session, UiPreferences};
use scribe_engine::ProcessingController;
use scribe_storage::SessionStore;
use std::path::PathBuf;

use super::{Settings, load_documents};
use crate::cli::{InputArgs, SessionCommands};

pub async fn handle(cmd: SessionCommands, controller: &ProcessingController, config: &Config) -> Result<()> {
    let store = SessionStore::new();
    match cmd {
        SessionCommands::Save { input, output } => save(&store, controller, config, input, output).await,
        SessionCommands::Show { path } => show(&store, path),
    }
}

async fn save(
    store: &SessionStore,
    controller: &ProcessingController,
    config: &Config,
    input: InputArgs,
    output: PathBuf,
) -> Result<()> {
    let settings = Settings::resolve(&input, config);
    let documents = load_documents(controller, &input, &settings).await?;

    let mut session = Session::new();
    session.ui_preferences = UiPreferences {
        selected_tokenizer: settings.tokenizer.clone(),
        split_method: settings.method,
        token_limit: settings.token_limit,
    };
    for doc in documents {
        session.record_chunks(doc.path, doc.chunks, settings.file_config());
    }

    // Analysis history is a premium feature; chunks are always saved
    let with_history = controller.require(Feature::SessionHistory).is_ok();
    if with_history {
        let chunks: Vec<String> = session
            .files
            .iter()
            .flat_map(|f| f.chunks.iter().cloned())
            .collect();
        session.set_analysis(controller.analyze_chunks(
            &chunks,
            &settings.tokenizer,
            settings.token_limit,
        )?);
    }

    let path = store
        .save(&session, &output)
        .with_context(|| format!("Failed to save session to {}", output.display()))?;

    println!("✓ Saved session: {}", path.display());
    println!("  ID: {}", session.id);
    println!("  Files: {}", session.files.len());
    println!("  Chunks: {}", session.total_chunks());
    if !with_history {
        println!("  Analysis history needs a premium license (scribe license upgrade)");
    }

    Ok(())
}

fn show(store: &SessionStore, path: PathBuf) -> Result<()> {
    let session = store
        .load(&path)
        .with_context(|| format!("Failed to load session {}", path.display()))?;

    println!("Session: {}", session.id);
    println!("  Created: {}", session.created_at);
    println!("  Updated: {}", session.updated_at);
    println!(
        "  Preferences: {} tokenizer, {} split, limit {}",
        session.ui_preferences.selected_tokenizer,
        session.ui_preferences.split_method,
        session.ui_preferences.token_limit
    );

    println!("  Files:");
    for file in &session.files {
        println!("    {} ({} chunks)", file.path, file.chunks.len());
        println!(
            "      {} split, {} tokenizer",
            file.config.split_method, file.config.tokenizer
        );
    }

    if let Some(analysis) = &session.last_analysis {
        println!();
        super::process::print_analysis(analysis, true);
    }

    Ok(())
}
