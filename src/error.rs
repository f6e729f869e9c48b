//! Error types for configuration and the translation seam.
//!
//! Scanning, protection, restoration, validation and rendering never fail; malformed
//! placeholders are treated as ordinary text.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeTagError {
    /// Configuration rejected by [`Config::validate`](crate::config::Config::validate)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Locale code rejected before calling a translator
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// A translator failed to translate a text
    #[error("Translation error: {0}")]
    Translation(String),

    /// A translator returned a different number of texts than it was given
    #[error("Translator returned {actual} texts for a batch of {expected}")]
    BatchMismatch { expected: usize, actual: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MergeTagError>;
