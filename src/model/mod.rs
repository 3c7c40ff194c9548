//! Local language model: the completion contract and its initializer.
//!
//! [`CompletionModel`] is the only surface the categorizer sees, so any
//! backend (or a scripted one in tests) can stand in for the GGUF model
//! built by [`initialize_model`].

mod gguf;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::ModelConfig;
use crate::error::{CategorizerError, Result};
use crate::logging::MODEL_LOAD;

pub use gguf::GgufModel;

/// Fixed runtime parameters of the loaded model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelParams {
    /// Context window in tokens, prompt and completion together.
    pub n_ctx: usize,
    /// Worker threads used for inference.
    pub n_threads: usize,
    /// Layers offloaded to a GPU. Zero keeps everything on the CPU.
    pub n_gpu_layers: u32,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            n_ctx: 2048,
            n_threads: 4,
            n_gpu_layers: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: usize,
    pub temperature: f64,
    pub stop: Vec<String>,
    /// Prepend the prompt to the returned text.
    pub echo: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    Stop,
    Length,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub choices: Vec<CompletionChoice>,
}

impl Completion {
    pub fn single(text: impl Into<String>, finish_reason: FinishReason) -> Self {
        Completion {
            choices: vec![CompletionChoice {
                text: text.into(),
                finish_reason,
            }],
        }
    }

    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.text.as_str())
    }
}

pub trait CompletionModel {
    fn complete(&mut self, request: &CompletionRequest) -> Result<Completion>;
}

/// Log the configured path and what sits around it. Never fails.
fn debug_model_path(config: &ModelConfig) {
    info!(target: MODEL_LOAD, "Debug Information:");
    info!(
        target: MODEL_LOAD,
        "1. MODEL_PATH environment variable: {}",
        config.model_path.as_deref().unwrap_or("<unset>")
    );

    let Ok(model_path) = config.resolve_model_path() else {
        return;
    };
    info!(
        target: MODEL_LOAD,
        "2. Does direct model path exist? {}",
        model_path.exists()
    );

    let base_dir = match model_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    info!(
        target: MODEL_LOAD,
        "3. Base directory contents ({}):",
        base_dir.display()
    );
    log_directory(base_dir, 1);
}

fn log_directory(dir: &Path, depth: usize) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(target: MODEL_LOAD, "   Error reading directory: {}", e);
            return;
        }
    };

    let mut paths: Vec<_> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();

    for path in paths {
        if depth == 1 {
            info!(target: MODEL_LOAD, "   - {}", path.display());
            if path.is_dir() {
                info!(target: MODEL_LOAD, "     Contents of {}:", path.display());
                log_directory(&path, depth + 1);
            }
        } else {
            info!(target: MODEL_LOAD, "     * {}", path.display());
        }
    }
}

/// Resolve the model from `config` and load it with [`ModelParams::default`].
pub fn initialize_model(config: &ModelConfig) -> Result<GgufModel> {
    debug_model_path(config);

    let model_path = config.resolve_model_path()?;
    if !model_path.is_file() {
        return Err(CategorizerError::NotFound {
            what: "Model file",
            path: model_path,
        });
    }
    let tokenizer_path = config.resolve_tokenizer_path(&model_path)?;
    if !tokenizer_path.is_file() {
        return Err(CategorizerError::NotFound {
            what: "Tokenizer file",
            path: tokenizer_path,
        });
    }

    info!(
        target: MODEL_LOAD,
        "Attempting to load model from: {}",
        model_path.display()
    );
    GgufModel::load(
        &model_path,
        &tokenizer_path,
        ModelParams::default(),
        config.seed,
    )
    .inspect_err(|e| error!(target: MODEL_LOAD, "{}", e))
}
