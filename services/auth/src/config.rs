//! Service configuration
//!
//! Defaults overlaid by `AUTH_*` environment variables, e.g. `AUTH_PORT=4000`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Authentication service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Origin allowed by CORS
    pub frontend_url: String,
}

impl AuthConfig {
    /// Load the configuration from defaults and the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000_i64)?
            .set_default("frontend_url", "http://localhost:3000")?
            .add_source(Environment::with_prefix("AUTH").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Socket address to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
