use clap::{Args, Parser, Subcommand};
use scribe_core::SplitMethod;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scribe")]
#[command(about = "Chunk documents, measure them in tokens, and estimate fine-tuning cost", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to read documents from and how to chunk them
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Files or glob patterns (.txt, .md)
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Split method: paragraph, sentence or custom
    #[arg(long)]
    pub method: Option<SplitMethod>,

    /// Delimiter for the custom split method
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Keep headers, bullets and whitespace as they are
    #[arg(long)]
    pub no_clean: bool,

    /// Tokenizer to count with
    #[arg(long)]
    pub tokenizer: Option<String>,

    /// Token limit per chunk
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean and split documents, then print the chunk count
    Process {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show how individual chunks fit the token limit
    Preview {
        #[command(flatten)]
        input: InputArgs,

        /// Number of chunks to show
        #[arg(long, default_value = "20")]
        max: usize,
    },

    /// Token statistics for the chunked documents
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tokenizers and whether the current license can use them
    Tokenizers {
        #[arg(long)]
        json: bool,
    },

    /// Count a sample with several tokenizers
    Compare {
        /// Sample text
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// Take the sample from the start of a document
        #[arg(long)]
        file: Option<PathBuf>,

        /// Maximum number of tokenizers to compare
        #[arg(long, default_value = "5")]
        max: usize,
    },

    /// Estimate what fine-tuning on the chunked documents would cost
    Costs {
        #[command(flatten)]
        input: InputArgs,

        /// Target model (repeatable); defaults to the configured models
        #[arg(long = "model")]
        models: Vec<String>,

        /// Tokens per month currently sent to a hosted API
        #[arg(long)]
        api_usage: Option<u64>,

        /// Only show the rough cost band
        #[arg(long)]
        preview: bool,

        /// Write the report to a .json, .csv or text file
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Write chunks to a file for training
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,

        /// txt, csv, json or jsonl (defaults to the output extension)
        #[arg(long)]
        format: Option<String>,

        /// Include per-chunk token counts (csv and json)
        #[arg(long)]
        with_counts: bool,
    },

    /// Save or inspect processing sessions
    #[command(subcommand)]
    Session(SessionCommands),

    /// Manage the license and trial
    #[command(subcommand)]
    License(LicenseCommands),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Process documents and save the chunks to a session file
    Save {
        #[command(flatten)]
        input: InputArgs,

        /// Session file (.wsession is added when there is no extension)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Summarize a saved session
    Show {
        path: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum LicenseCommands {
    /// Show license status
    Status,

    /// Start the one-time premium trial
    Trial,

    /// Activate a license key
    Activate {
        key: String,
    },

    /// List premium features
    Upgrade,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,
}
