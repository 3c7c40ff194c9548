//! Error types for pdf-categorizer.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CategorizerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{what} not found at {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    #[error("Error extracting text from PDF: {0}")]
    Extraction(String),

    #[error("Error initializing model: {0}")]
    ModelLoad(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<lopdf::Error> for CategorizerError {
    fn from(err: lopdf::Error) -> Self {
        CategorizerError::Extraction(err.to_string())
    }
}

impl From<candle_core::Error> for CategorizerError {
    fn from(err: candle_core::Error) -> Self {
        CategorizerError::Inference(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CategorizerError>;
