//! Error types for realignment.

use std::path::PathBuf;
use thiserror::Error;

/// A single probe call failed. Always recovered per segment or per conflict pair.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("speech engine error: {0}")]
    Engine(#[from] jimaku_stt::SttError),
}

/// Configuration could not be loaded or is out of range.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for '{field}': {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}
