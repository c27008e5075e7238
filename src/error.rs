//! Error types for dataset construction.
//!
//! "Insufficient data" and "no usable samples" are not errors; they are
//! reported through [`crate::pipeline::DatasetStatus`]. Everything here is a
//! genuine failure: a violated precondition, a malformed panel, or an I/O
//! problem at the provider/export boundary.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    /// Parameter misuse (window/horizon out of range, bad instrument set).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Panel invariants violated (gaps, unordered dates, shape mismatch).
    #[error("Invalid panel: {0}")]
    InvalidPanel(String),

    /// Feature and target rows cannot be kept in lockstep.
    #[error("Alignment error: {0}")]
    Alignment(String),

    /// The price provider could not produce a panel.
    #[error("Provider failure: {0}")]
    Provider(String),

    /// Nothing to export, or the output location is unusable.
    #[error("Export failed: {0}")]
    Export(String),

    #[error("IO operation failed")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Failed to write npy array: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),

    #[error("Failed to parse date: {0}")]
    Date(#[from] chrono::ParseError),
}

impl DatasetError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn panel(msg: impl Into<String>) -> Self {
        Self::InvalidPanel(msg.into())
    }

    pub fn alignment(msg: impl Into<String>) -> Self {
        Self::Alignment(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}
