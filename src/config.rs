// src/config.rs
use crate::core::types::CancerType;
use crate::error::ConfigError;
use reqwest::Url;

pub const API_URL_ENV: &str = "CANCER_PREDICTOR_API_URL";
pub const DEFAULT_API_BASE_URL: &str = "https://cancer-predictor-production-ae67.up.railway.app";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Reads the base URL from the environment, falling back to the production service.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::with_base_url(&url),
            _ => Ok(Self::default()),
        }
    }

    pub fn with_base_url(url: &str) -> Result<Self, ConfigError> {
        let trimmed = url.trim().trim_end_matches('/');
        let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(invalid("scheme must be http or https"));
        }
        Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        Ok(Self {
            api_base_url: trimmed.to_string(),
        })
    }

    pub fn cancer_types_url(&self) -> Result<Url, ConfigError> {
        self.endpoint(&["cancer-types"])
    }

    pub fn inputs_url(&self, cancer_type: &CancerType) -> Result<Url, ConfigError> {
        self.endpoint(&["inputs", cancer_type.as_str()])
    }

    pub fn predict_url(&self, cancer_type: &CancerType) -> Result<Url, ConfigError> {
        self.endpoint(&["predict", cancer_type.as_str()])
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            reason: reason.to_string(),
        };
        let mut url = Url::parse(&self.api_base_url).map_err(|e| invalid(&e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
