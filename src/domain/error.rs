// ============================================================
// Layer 3 - Error Taxonomy
// ============================================================
// Fatal-at-startup failures get their own types so callers can
// tell a bad input directory from a bad flag value. Everything
// downstream of startup propagates through anyhow.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading or interpreting the sequence files.
#[derive(Error, Debug)]
pub enum DataError {
    /// One of the three expected split files is not on disk.
    #[error("missing sequence file: {path}")]
    MissingFile { path: PathBuf },

    /// The file exists but does not decode to sequences of item ids.
    #[error("cannot decode '{path}': {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Every sequence in every split is empty, so there is no
    /// maximum item id to derive the vocabulary size from.
    #[error("all sequences are empty; cannot derive the vocabulary size")]
    EmptyVocabulary,
}

/// A configuration value that would produce silently wrong batches
/// is rejected before any work starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid { field, message: message.into() }
    }
}
