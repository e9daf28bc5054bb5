//! Error types for pdfcast.

use thiserror::Error;

/// Library-level error type for pdfcast operations.
#[derive(Error, Debug)]
pub enum PdfcastError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{provider}' does not support {operation}")]
    UnsupportedOperation {
        provider: String,
        operation: &'static str,
    },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Transcript error: {0}")]
    Transcript(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for pdfcast operations.
pub type Result<T> = std::result::Result<T, PdfcastError>;
