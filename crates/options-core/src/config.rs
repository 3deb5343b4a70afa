//! API Configuration
//!
//! Where the options backend lives and how to authenticate against it.

use std::str::FromStr;

use log::LevelFilter;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(String),

    #[error("base url '{url}' is invalid: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("unknown log level '{0}'")]
    InvalidLogLevel(String),
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Options API connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Absolute prefix the `/options` routes hang off, e.g. `https://host/api`
    pub base_url: String,
    /// Sent as `Authorization: Bearer <token>` when present
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            log_level: default_log_level(),
        }
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Parse and validate an embedded JSON config
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: ApiConfig =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()
    }

    /// Check the base url and log level, dropping any trailing slash
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.base_url.trim().trim_end_matches('/').to_string();
        let url = Url::parse(&trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        self.log_level_filter()?;
        self.base_url = trimmed;
        Ok(self)
    }

    pub fn log_level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    pub fn base(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })
    }
}
