//! Gemini API configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Gemini generative API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// Gemini API key
    pub api_key: Option<Secret<String>>,

    /// Model used for `generateContent`
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the generative language API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// Validate Gemini configuration
    ///
    /// A missing key is allowed here; `AppConfig::validate` only demands one
    /// in production, and without it every job answers with an apology.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("GEMINI__MODEL"));
        }
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidUrl("gemini"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout("gemini"));
        }
        Ok(())
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout() -> u64 {
    30
}
