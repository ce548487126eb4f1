//! Error types for Iris

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown experiment: {0}")]
    UnknownExperiment(String),

    #[error("state outside model lineage: {0}")]
    ForeignState(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    pub fn foreign_state(reason: impl Into<String>) -> Self {
        Self::ForeignState(reason.into())
    }
}
