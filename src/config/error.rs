//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A setting the service cannot start with. Section names are lowercase.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Listen host '{0}' is not an IP address")]
    InvalidListenHost(String),

    #[error("Invalid {0} timeout")]
    InvalidTimeout(&'static str),

    #[error("Invalid {0} URL")]
    InvalidUrl(&'static str),

    #[error("Cache TTL for {0} must be greater than zero")]
    InvalidTtl(&'static str),

    #[error("Generation worker count must be between 1 and 64")]
    InvalidWorkerCount,

    #[error("Queue capacity {capacity} is smaller than the {workers} workers")]
    QueueSmallerThanPool { capacity: usize, workers: usize },

    #[error("Store timeout {store_secs}s must be below request timeout {request_secs}s")]
    StoreTimeoutExceedsRequest { store_secs: u64, request_secs: u64 },

    #[error("In-memory cache backend is not allowed in production")]
    MemoryCacheInProduction,

    #[error("Admin token must be at least {0} characters")]
    AdminTokenTooShort(usize),
}
