//! Webhook listener settings

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use super::error::ValidationError;

/// Where the webhook listens and how its requests are bounded.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Deadline for one webhook turn; must outlast the curriculum store timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Comma-separated browser origins allowed by CORS; empty means any
    #[serde(default)]
    pub cors_origins: String,
}

/// Deployment stage. Production switches on JSON logs and stricter checks.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl ServerConfig {
    /// Parsed listen address. `host` must be an IP literal.
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let ip = self
            .host
            .parse()
            .map_err(|_| ValidationError::InvalidListenHost(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cors_origins(&self) -> impl Iterator<Item = &str> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        self.socket_addr()?;
        if !(1..=120).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout("server"));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout(),
            cors_origins: String::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info,learnable_chatbot=debug".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listens_on_all_interfaces_by_default() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn hostnames_are_not_listen_addresses() {
        let config = ServerConfig {
            host: "localhost".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidListenHost("localhost".to_string()))
        );
    }

    #[test]
    fn cors_origins_skip_blanks() {
        let config = ServerConfig {
            cors_origins: "https://learnable.app, ,http://localhost:3000".to_string(),
            ..Default::default()
        };
        let origins: Vec<_> = config.cors_origins().collect();
        assert_eq!(origins, vec!["https://learnable.app", "http://localhost:3000"]);

        assert_eq!(ServerConfig::default().cors_origins().count(), 0);
    }

    #[test]
    fn rejects_zero_port_and_out_of_range_timeouts() {
        let zero_port = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(zero_port.validate(), Err(ValidationError::InvalidPort));

        for secs in [0, 121] {
            let config = ServerConfig {
                request_timeout_secs: secs,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout("server")));
        }
    }
}
