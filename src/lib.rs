pub mod categorize;
pub mod chunker;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod parse;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::categorize::{categorize_text, ResponseRecord};
use crate::config::Settings;
use crate::error::Result;
use crate::model::{initialize_model, CompletionModel};
use crate::parse::extract_text;

const PDF_SUFFIX: &str = ".pdf";
const RESULTS_SUFFIX: &str = "_results.json";

/// `transcript.pdf` -> `transcript_results.json`. Every `.pdf` in the path is
/// replaced; a path without one gets the suffix appended instead so the
/// input is never the output.
pub fn results_path<P: AsRef<Path>>(pdf_path: P) -> PathBuf {
    let raw = pdf_path.as_ref().to_string_lossy();
    if raw.contains(PDF_SUFFIX) {
        PathBuf::from(raw.replace(PDF_SUFFIX, RESULTS_SUFFIX))
    } else {
        PathBuf::from(format!("{raw}{RESULTS_SUFFIX}"))
    }
}

/// Write records as a 2-space indented JSON array.
pub fn write_results<P: AsRef<Path>>(path: P, records: &[ResponseRecord]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

/// Extract, categorize, and save using an already loaded model.
pub fn process_pdf_with_model<M>(
    pdf_path: &Path,
    model: &mut M,
    max_words: usize,
) -> Result<Vec<ResponseRecord>>
where
    M: CompletionModel + ?Sized,
{
    let pdf_text = extract_text(pdf_path)?;

    let records = categorize_text(&pdf_text, model, max_words);

    let output_path = results_path(pdf_path);
    write_results(&output_path, &records)?;
    info!(
        records = records.len(),
        output = %output_path.display(),
        "Results saved"
    );

    Ok(records)
}

/// Load the model named by `settings`, then process `settings.pdf_path`.
pub fn process_pdf(settings: &Settings) -> Result<Vec<ResponseRecord>> {
    let run = || {
        let mut model = initialize_model(&settings.model)?;
        process_pdf_with_model(&settings.pdf_path, &mut model, settings.max_words)
    };

    run().inspect_err(|e| error!("Error processing PDF: {}", e))
}
