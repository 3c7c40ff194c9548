use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{error, info};

use pdf_categorizer::config::{
    ModelConfig, Settings, DEFAULT_MAX_WORDS, DEFAULT_PDF_PATH, DEFAULT_SEED,
};
use pdf_categorizer::logging::{init_logging, init_logging_with_dir};
use pdf_categorizer::process_pdf;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = "Extract structured records from a PDF with a local language model."
)]
pub struct Args {
    /// Path to the PDF file to process
    #[clap(default_value = DEFAULT_PDF_PATH)]
    pub pdf_path: PathBuf,

    /// Model weights (GGUF). Overrides MODEL_PATH.
    #[clap(long)]
    pub model_path: Option<String>,

    /// tokenizer.json for the model. Overrides TOKENIZER_PATH.
    #[clap(long)]
    pub tokenizer_path: Option<String>,

    /// Maximum words per chunk sent to the model
    #[clap(long, default_value_t = DEFAULT_MAX_WORDS)]
    pub max_words: usize,

    /// Sampling seed
    #[clap(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Enable debug logging
    #[clap(long)]
    pub debug: bool,

    /// Also write logs to this directory
    #[clap(long)]
    pub log_dir: Option<PathBuf>,
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }

    fn into_settings(self) -> Settings {
        let mut model = ModelConfig::from_env();
        if self.model_path.is_some() {
            model.model_path = self.model_path;
        }
        if self.tokenizer_path.is_some() {
            model.tokenizer_path = self.tokenizer_path;
        }
        model.seed = self.seed;

        Settings {
            pdf_path: self.pdf_path,
            max_words: self.max_words,
            model,
        }
    }
}

fn run(settings: &Settings) -> Result<()> {
    if !settings.pdf_path.exists() {
        bail!("PDF file not found at {}", settings.pdf_path.display());
    }

    let results = process_pdf(settings)?;
    info!("Processing completed successfully");
    println!("Results: {}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse_args();

    // Keep the guards alive until exit so buffered log lines are flushed
    let _guards = match &args.log_dir {
        Some(log_dir) => match init_logging_with_dir(args.debug, log_dir.clone()) {
            Ok((stdout, file)) => vec![stdout, file],
            Err(e) => {
                eprintln!("Failed to create log directory {}: {}", log_dir.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => vec![init_logging(args.debug)],
    };

    let settings = args.into_settings();
    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Application error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
