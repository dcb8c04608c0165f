use scribe_core::{
    CleanOptions, DEFAULT_TOKENIZER, Error, FileConfig, LicenseStatus, Session, SplitMethod,
    StaticLicense,
};
use scribe_engine::ProcessingController;
use scribe_storage::{FileLicense, SessionStore, StorageError};
use tempfile::TempDir;

const BOOK: &str = "The Project Gutenberg eBook of a Short Test\n\
*** START OF THE PROJECT GUTENBERG EBOOK A SHORT TEST ***\n\
Chapter One\n\
\n\
It was a bright cold day in April, and the clocks were striking thirteen.\n\
\n\
1\n\
\n\
- The hallway smelt of boiled cabbage and old rag mats.\n\
\n\
Copyright 1949 Somebody\n\
*** END OF THE PROJECT GUTENBERG EBOOK A SHORT TEST ***\n\
License boilerplate that should never be chunked.";

fn free_controller() -> ProcessingController {
    ProcessingController::new(Box::new(StaticLicense::free()))
}

fn premium_controller() -> ProcessingController {
    ProcessingController::new(Box::new(StaticLicense::premium()))
}

#[tokio::test]
async fn test_book_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("book.txt");
    std::fs::write(&path, BOOK).unwrap();

    let controller = free_controller();
    let chunks = controller
        .process_book(&path, &CleanOptions::default(), SplitMethod::Paragraph, None)
        .await
        .unwrap();

    assert_eq!(
        chunks,
        vec![
            "Chapter One",
            "It was a bright cold day in April, and the clocks were striking thirteen.",
            "The hallway smelt of boiled cabbage and old rag mats.",
        ]
    );

    let analysis = controller
        .analyze_chunks(&chunks, DEFAULT_TOKENIZER, 512)
        .unwrap();
    assert_eq!(analysis.total_chunks, 3);
    assert_eq!(analysis.over_limit, 0);
    assert!(analysis.total_tokens > 0);
}

#[tokio::test]
async fn test_unsupported_and_missing_documents() {
    let temp_dir = TempDir::new().unwrap();
    let controller = free_controller();
    let opts = CleanOptions::default();

    let pdf = temp_dir.path().join("book.pdf");
    std::fs::write(&pdf, b"%PDF-1.7").unwrap();
    assert!(matches!(
        controller.process_book(&pdf, &opts, SplitMethod::Paragraph, None).await,
        Err(Error::UnsupportedFormat(_))
    ));

    let missing = temp_dir.path().join("missing.txt");
    assert!(matches!(
        controller.process_book(&missing, &opts, SplitMethod::Paragraph, None).await,
        Err(Error::Io(_))
    ));
}

#[test]
fn test_analysis_is_deterministic() {
    let controller = free_controller();
    let chunks: Vec<String> = (1..40).map(|n| "token ".repeat(n * 7)).collect();

    let first = controller.analyze_chunks(&chunks, DEFAULT_TOKENIZER, 128).unwrap();
    let second = controller.analyze_chunks(&chunks, DEFAULT_TOKENIZER, 128).unwrap();
    assert_eq!(first, second);
    assert!((0.0..=100.0).contains(&first.over_limit_percentage));
}

#[test]
fn test_empty_chunks_analysis() {
    let controller = free_controller();
    let analysis = controller.analyze_chunks(&[], DEFAULT_TOKENIZER, 512).unwrap();

    assert_eq!(analysis.total_chunks, 0);
    assert_eq!(analysis.total_tokens, 0);
    assert_eq!(analysis.over_limit_percentage, 0.0);
}

#[test]
fn test_tokenizer_switch_recounts() {
    let controller = premium_controller();
    let chunks = vec![
        "Tokenization schemes rarely agree on punctuation-heavy text!!! ...".to_string(),
        "Supercalifragilisticexpialidocious words stress every vocabulary.".to_string(),
    ];

    let gpt2 = controller.analyze_chunks(&chunks, "gpt2", 512).unwrap();
    let claude = controller.analyze_chunks(&chunks, "claude", 512).unwrap();
    assert_eq!(gpt2.tokenizer, "gpt2");
    assert_eq!(claude.tokenizer, "claude");
    assert_ne!(gpt2.total_tokens, claude.total_tokens);
}

#[test]
fn test_unknown_and_premium_tokenizers() {
    let controller = free_controller();
    let chunks = vec!["hello".to_string()];

    assert!(matches!(
        controller.analyze_chunks(&chunks, "bert", 512),
        Err(Error::UnknownTokenizer(_))
    ));
    assert!(matches!(
        controller.get_token_count("hello", "gpt-4"),
        Err(Error::AccessDenied(_))
    ));

    let listing = controller.get_available_tokenizers();
    assert_eq!(listing[0].name, DEFAULT_TOKENIZER);
    assert!(listing.iter().skip(1).all(|d| d.is_premium && !d.has_access));
}

#[test]
fn test_cost_analysis_gated() {
    let chunks = vec!["word ".repeat(300); 40];
    let models = ["llama-2-7b", "claude-3-haiku"];

    assert!(matches!(
        free_controller().analyze_chunks_with_costs(&chunks, DEFAULT_TOKENIZER, 512, &models, 0),
        Err(Error::AccessDenied(_))
    ));

    let report = premium_controller()
        .analyze_chunks_with_costs(&chunks, DEFAULT_TOKENIZER, 512, &models, 100_000)
        .unwrap();
    assert_eq!(report.cost_analysis.dataset_tokens, report.analysis.total_tokens);
    assert_eq!(report.cost_analysis.summary.models_compared, 2);
    assert!(report.cost_analysis.roi.is_some());

    let ranked = &report.cost_analysis.ranked;
    assert!(ranked.windows(2).all(|w| w[0].total_cost_usd <= w[1].total_cost_usd));
    assert_eq!(
        report.cost_analysis.summary.best_overall.as_ref().unwrap().cost,
        ranked[0].total_cost_usd
    );
}

#[test]
fn test_cost_preview_is_free() {
    let preview = free_controller().cost_preview(1_000_000);
    assert!(preview.low < preview.high);
}

#[tokio::test]
async fn test_cost_estimate_off_thread() {
    let controller = premium_controller();
    let estimator = controller.cost_estimator();

    let result = tokio::task::spawn_blocking(move || estimator.estimate(2_000_000, &["mistral-7b"], 0))
        .await
        .unwrap()
        .unwrap();
    assert!(!result.ranked.is_empty());
}

#[tokio::test]
async fn test_spawned_cost_analysis_matches_inline() {
    let chunks = vec!["word ".repeat(200); 25];
    let models = vec!["llama-2-7b".to_string(), "gpt-4o-mini".to_string()];

    assert!(matches!(
        free_controller()
            .spawn_cost_analysis(&chunks, DEFAULT_TOKENIZER, 512, models.clone(), 0)
            .await,
        Err(Error::AccessDenied(_))
    ));

    let controller = premium_controller();
    let spawned = controller
        .spawn_cost_analysis(&chunks, DEFAULT_TOKENIZER, 512, models.clone(), 50_000)
        .await
        .unwrap();
    let inline = controller
        .analyze_chunks_with_costs(&chunks, DEFAULT_TOKENIZER, 512, &models, 50_000)
        .unwrap();
    assert_eq!(spawned, inline);
}

#[test]
fn test_session_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let controller = free_controller();
    let chunks = controller
        .process_text(BOOK, &CleanOptions::default(), SplitMethod::Sentence, None)
        .unwrap();

    let mut session = Session::new();
    session.record_chunks(
        "book.txt",
        chunks.clone(),
        FileConfig {
            split_method: SplitMethod::Sentence,
            ..FileConfig::default()
        },
    );
    session.set_analysis(controller.analyze_chunks(&chunks, DEFAULT_TOKENIZER, 512).unwrap());

    let store = SessionStore::new();
    let path = store.save(&session, &temp_dir.path().join("book")).unwrap();
    let loaded = store.load(&path).unwrap();

    assert_eq!(loaded.file("book.txt").unwrap().chunks, chunks);
    assert_eq!(loaded.files, session.files);
    assert_eq!(loaded.last_analysis, session.last_analysis);

    let tampered = std::fs::read_to_string(&path)
        .unwrap()
        .replace("clocks were striking", "clocks were stopping");
    std::fs::write(&path, tampered).unwrap();
    assert!(matches!(store.load(&path), Err(StorageError::CorruptSession(_))));
}

#[test]
fn test_trial_unlocks_cost_analysis() {
    let temp_dir = TempDir::new().unwrap();
    let license = FileLicense::open(temp_dir.path().join("license.json")).unwrap();
    let mut controller = ProcessingController::new(Box::new(license));
    let chunks = vec!["word ".repeat(100); 10];

    assert_eq!(controller.get_licensing_info().license_status, LicenseStatus::Free);
    assert!(controller
        .analyze_chunks_with_costs(&chunks, DEFAULT_TOKENIZER, 512, &["llama-2-7b"], 0)
        .is_err());

    assert!(controller.start_trial());
    assert!(!controller.start_trial());
    assert_eq!(controller.get_licensing_info().license_status, LicenseStatus::Trial);
    assert!(controller
        .analyze_chunks_with_costs(&chunks, DEFAULT_TOKENIZER, 512, &["llama-2-7b"], 0)
        .is_ok());
}
