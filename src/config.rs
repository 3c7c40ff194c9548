use std::path::{Path, PathBuf};

use crate::error::{CategorizerError, Result};

pub const MODEL_PATH_ENV: &str = "MODEL_PATH";
pub const TOKENIZER_PATH_ENV: &str = "TOKENIZER_PATH";

pub const DEFAULT_PDF_PATH: &str = "data/transcript.pdf";
pub const DEFAULT_MAX_WORDS: usize = 512;
pub const DEFAULT_SEED: u64 = 42;

/// File name looked up next to the weights when no tokenizer path is given.
const DEFAULT_TOKENIZER_FILE: &str = "tokenizer.json";

/// Where to find the model and how to sample from it.
///
/// Paths are kept as raw strings until resolution so that an unset
/// `MODEL_PATH` is reported as a configuration error at model
/// initialization rather than when arguments are parsed.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_path: Option<String>,
    pub tokenizer_path: Option<String>,
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            model_path: None,
            tokenizer_path: None,
            seed: DEFAULT_SEED,
        }
    }
}

impl ModelConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        ModelConfig {
            model_path: lookup(MODEL_PATH_ENV),
            tokenizer_path: lookup(TOKENIZER_PATH_ENV),
            ..Default::default()
        }
    }

    /// The configured weights path, with `~` and `$VAR` expanded.
    pub fn resolve_model_path(&self) -> Result<PathBuf> {
        match self.model_path.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => expand(raw),
            _ => Err(CategorizerError::Config(format!(
                "{MODEL_PATH_ENV} environment variable is not set"
            ))),
        }
    }

    pub fn resolve_tokenizer_path(&self, model_path: &Path) -> Result<PathBuf> {
        match self.tokenizer_path.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => expand(raw),
            _ => Ok(model_path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(DEFAULT_TOKENIZER_FILE)),
        }
    }
}

fn expand(raw: &str) -> Result<PathBuf> {
    shellexpand::full(raw)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| CategorizerError::Config(format!("cannot expand {raw:?}: {e}")))
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub pdf_path: PathBuf,
    pub max_words: usize,
    pub model: ModelConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            pdf_path: PathBuf::from(DEFAULT_PDF_PATH),
            max_words: DEFAULT_MAX_WORDS,
            model: ModelConfig::default(),
        }
    }
}
