// src/error.rs
use thiserror::Error;

/// Failure talking to the prediction service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("service answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A submit attempt the store refused before any request was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no cancer type selected")]
    NoCancerType,
    #[error("no answers entered")]
    NoAnswers,
    #[error("a prediction is already in flight")]
    AlreadySubmitting,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
