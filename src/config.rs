//! Application configuration loaded from environment variables.
//!
//! Everything needed to reach the document database is read once at
//! startup. A missing or unreachable database is not a configuration
//! error: the storage layer falls back to memory instead.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default bound on connecting to (and probing) the database.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3000;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID holding the Firestore database
    pub gcp_project_id: String,
    /// Upper bound for the connection attempt, in milliseconds
    pub connect_timeout_ms: u64,
    /// Optional JSON seed file overriding the embedded catalog
    pub seed_data_path: Option<PathBuf>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            seed_data_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `FIRESTORE_EMULATOR_HOST` is not stored here; the Firestore
    /// connector reads it directly when choosing how to authenticate.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let connect_timeout_ms = match env::var("DB_CONNECT_TIMEOUT_MS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("DB_CONNECT_TIMEOUT_MS", raw))?,
            Err(_) => DEFAULT_CONNECT_TIMEOUT_MS,
        };

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            connect_timeout_ms,
            seed_data_path: env::var("SEED_DATA_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    /// Connection timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
