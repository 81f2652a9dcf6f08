//! Service configuration, read from `LEARNABLE__*` environment variables.
//!
//! Each section lives in its own module and checks its own values; checks that
//! span sections (production rules, timeout ordering) live in
//! [`AppConfig::validate`].
//!
//! ```no_run
//! use learnable_chatbot::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod admin;
mod ai;
mod cache;
mod error;
mod firestore;
mod generation;
mod redis;
mod server;

pub use admin::{AdminConfig, MIN_ADMIN_TOKEN_LEN};
pub use ai::GeminiConfig;
pub use cache::{CacheBackend, CacheConfig};
pub use error::{ConfigError, ValidationError};
pub use firestore::FirestoreConfig;
pub use generation::GenerationConfig;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Every section has defaults, so an empty environment deserializes and the
/// gaps surface in [`AppConfig::validate`] instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Only read when the cache backend is Redis
    #[serde(default)]
    pub redis: RedisConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub firestore: FirestoreConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

impl AppConfig {
    /// Reads `.env` when present, then `LEARNABLE__<SECTION>__<FIELD>`
    /// variables, e.g. `LEARNABLE__GEMINI__API_KEY`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LEARNABLE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Rejects settings the webhook cannot serve with.
    ///
    /// Production additionally needs Redis behind the cache, a Gemini key and
    /// a long admin token when one is set. The curriculum store timeout must
    /// stay under the request timeout so a slow store still gets the fallback
    /// reply instead of a cut connection.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.cache.validate()?;
        match self.cache.backend {
            CacheBackend::Redis => self.redis.validate()?,
            CacheBackend::Memory if self.is_production() => {
                return Err(ValidationError::MemoryCacheInProduction);
            }
            CacheBackend::Memory => {}
        }

        self.firestore.validate()?;
        if self.firestore.timeout_secs >= self.server.request_timeout_secs {
            return Err(ValidationError::StoreTimeoutExceedsRequest {
                store_secs: self.firestore.timeout_secs,
                request_secs: self.server.request_timeout_secs,
            });
        }

        self.gemini.validate()?;
        if self.is_production() && !self.gemini.has_api_key() {
            return Err(ValidationError::MissingRequired("GEMINI__API_KEY"));
        }

        self.generation.validate()?;
        self.admin.validate(&self.server.environment)?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
