// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PairRankError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("Invalid configuration value for `{key}`: {message}")]
    Config { key: String, message: String },

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A pairs group started with a per-neighbour record instead of its total.
    #[error("Data integrity error: no total record precedes the pairs of term `{term}`")]
    MissingTotal { term: String },

    #[error("Rank graph is {actual}, expected {expected}")]
    InvalidPhase {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Generic error: {0}")]
    Other(String),
}

impl PairRankError {
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }

    /// Errors that only invalidate one group; the job keeps going.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MissingTotal { .. })
    }
}

pub type Result<T> = std::result::Result<T, PairRankError>;

// Allow `?` on std::io::Error by converting to PairRankError::Io with unknown path.
impl From<std::io::Error> for PairRankError {
    fn from(source: std::io::Error) -> Self {
        PairRankError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}

// Gracefully convert WalkDir errors
impl From<walkdir::Error> for PairRankError {
    fn from(e: walkdir::Error) -> Self {
        PairRankError::Other(e.to_string())
    }
}
