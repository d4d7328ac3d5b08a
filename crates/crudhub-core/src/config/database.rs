//! Database configuration.

use serde::{Deserialize, Serialize};

/// MongoDB connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// MongoDB connection string.
    #[serde(default = "default_uri")]
    pub uri: String,
    /// Database name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Application name reported to the server.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    /// Upper bound on concurrent per-entity writes during bulk saves.
    #[serde(default = "default_bulk_concurrency")]
    pub bulk_concurrency: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            name: default_name(),
            app_name: default_app_name(),
            connect_timeout_seconds: default_connect_timeout(),
            max_pool_size: default_max_pool_size(),
            bulk_concurrency: default_bulk_concurrency(),
        }
    }
}

fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_name() -> String {
    "crudhub".to_string()
}

fn default_app_name() -> String {
    "crudhub".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_pool_size() -> u32 {
    20
}

fn default_bulk_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
