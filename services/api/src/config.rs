//! Service configuration
//!
//! Defaults overlaid by `API_*` environment variables, e.g. `API_DEV_MODE=true`.

use std::path::PathBuf;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Default upload cap: 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Catalog API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory receiving uploaded photos, served under `/uploads`
    pub upload_dir: PathBuf,
    /// Base URL used in upload links; the request host is used when unset
    pub public_url: Option<String>,
    /// Origin allowed by CORS
    pub frontend_url: String,
    /// Include diagnostics in 500 responses
    pub dev_mode: bool,
    /// Largest accepted upload
    pub max_upload_bytes: usize,
}

impl ApiConfig {
    /// Load the configuration from defaults and the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3001_i64)?
            .set_default("upload_dir", "public/uploads")?
            .set_default("frontend_url", "http://localhost:3000")?
            .set_default("dev_mode", false)?
            .set_default("max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES as i64)?
            .add_source(Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Socket address to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            for key in [
                "API_PORT",
                "API_HOST",
                "API_UPLOAD_DIR",
                "API_PUBLIC_URL",
                "API_DEV_MODE",
                "API_MAX_UPLOAD_BYTES",
            ] {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert_eq!(config.upload_dir, PathBuf::from("public/uploads"));
        assert_eq!(config.public_url, None);
        assert_eq!(config.frontend_url, "http://localhost:3000");
        assert!(!config.dev_mode);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clear_env();
        unsafe {
            std::env::set_var("API_PORT", "8080");
            std::env::set_var("API_DEV_MODE", "true");
            std::env::set_var("API_PUBLIC_URL", "https://cars.example.com");
        }

        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.dev_mode);
        assert_eq!(
            config.public_url.as_deref(),
            Some("https://cars.example.com")
        );

        clear_env();
    }
}
