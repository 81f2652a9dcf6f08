//! Admin endpoint configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum admin token length accepted in production.
pub const MIN_ADMIN_TOKEN_LEN: usize = 16;

/// Admin configuration
///
/// Without a token the cache administration endpoint is disabled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    /// Bearer token required by admin endpoints
    pub token: Option<Secret<String>>,
}

impl AdminConfig {
    /// Returns the token when one is configured and non-empty
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_ref()
            .map(|t| t.expose_secret().as_str())
            .filter(|t| !t.is_empty())
    }

    /// Validate admin configuration
    ///
    /// In production, a configured token must be long enough to resist guessing.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if let Some(token) = self.token() {
            if *environment == Environment::Production && token.len() < MIN_ADMIN_TOKEN_LEN {
                return Err(ValidationError::AdminTokenTooShort(MIN_ADMIN_TOKEN_LEN));
            }
        }
        Ok(())
    }
}
