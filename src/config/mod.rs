//! Configuration module for the Zemora backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default admin password, matching the static site's client-side gate.
/// Replace via `ZEMORA_ADMIN_PASSWORD`; hardening the gate is a non-goal.
pub const DEFAULT_ADMIN_PASSWORD: &str = "zemora123";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret for the admin dashboard
    pub admin_password: String,
    /// Directory holding the durable per-collection JSON files
    pub data_dir: PathBuf,
    /// Directory holding the bundled read-only seed documents
    pub seed_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_password = env::var("ZEMORA_ADMIN_PASSWORD")
            .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());

        let data_dir = env::var("ZEMORA_DATA_DIR")
            .unwrap_or_else(|_| "./data/store".to_string())
            .into();

        let seed_dir = env::var("ZEMORA_SEED_DIR")
            .unwrap_or_else(|_| "./data/seed".to_string())
            .into();

        let bind_addr = env::var("ZEMORA_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid ZEMORA_BIND_ADDR format");

        let log_level = env::var("ZEMORA_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            admin_password,
            data_dir,
            seed_dir,
            bind_addr,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("ZEMORA_ADMIN_PASSWORD");
        env::remove_var("ZEMORA_DATA_DIR");
        env::remove_var("ZEMORA_SEED_DIR");
        env::remove_var("ZEMORA_BIND_ADDR");
        env::remove_var("ZEMORA_LOG_LEVEL");

        let config = Config::from_env();

        assert_eq!(config.admin_password, DEFAULT_ADMIN_PASSWORD);
        assert_eq!(config.data_dir, PathBuf::from("./data/store"));
        assert_eq!(config.seed_dir, PathBuf::from("./data/seed"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
    }
}
