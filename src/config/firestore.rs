//! Firestore configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Firestore REST configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreConfig {
    /// Google Cloud project id
    #[serde(default)]
    pub project_id: String,

    /// Database id inside the project
    #[serde(default = "default_database")]
    pub database: String,

    /// Base URL of the Firestore REST API (point at the emulator for local runs)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Static OAuth access token
    pub access_token: Option<Secret<String>>,

    /// Fetch access tokens from the GCE metadata server
    #[serde(default)]
    pub use_metadata_server: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl FirestoreConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Root path for documents of the configured database
    pub fn documents_path(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database
        )
    }

    /// Validate Firestore configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.project_id.is_empty() {
            return Err(ValidationError::MissingRequired("FIRESTORE__PROJECT_ID"));
        }
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidUrl("firestore"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 60 {
            return Err(ValidationError::InvalidTimeout("firestore"));
        }
        Ok(())
    }
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            database: default_database(),
            base_url: default_base_url(),
            access_token: None,
            use_metadata_server: false,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_timeout() -> u64 {
    10
}
