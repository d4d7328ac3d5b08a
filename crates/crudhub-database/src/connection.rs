//! MongoDB client management.

use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tracing::info;

use crudhub_core::config::DatabaseConfig;
use crudhub_core::error::{AppError, ErrorKind};

/// A connected MongoDB client bound to the configured database.
///
/// Cloning is cheap; the driver client is internally reference counted.
#[derive(Debug, Clone)]
pub struct MongoConnection {
    client: Client,
    database: Database,
    bulk_concurrency: usize,
}

impl MongoConnection {
    /// Connect using the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            uri = %mask_password(&config.uri),
            database = %config.name,
            max_pool_size = config.max_pool_size,
            "Connecting to MongoDB"
        );

        let mut options = ClientOptions::parse(&config.uri).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid MongoDB connection string: {e}"),
                e,
            )
        })?;
        options.app_name = Some(config.app_name.clone());
        options.max_pool_size = Some(config.max_pool_size);
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_seconds));
        options.server_selection_timeout =
            Some(Duration::from_secs(config.connect_timeout_seconds));

        let client = Client::with_options(options).map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to create MongoDB client: {e}"),
                e,
            )
        })?;

        let connection = Self {
            database: client.database(&config.name),
            client,
            bulk_concurrency: config.bulk_concurrency.max(1),
        };
        connection.health_check().await?;

        info!("Successfully connected to MongoDB");
        Ok(connection)
    }

    /// The configured database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// The underlying driver client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Upper bound on concurrent writes during bulk saves.
    pub fn bulk_concurrency(&self) -> usize {
        self.bulk_concurrency
    }

    /// Check connectivity with a `ping` command.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    /// Shut the client down, waiting for in-flight operations.
    pub async fn close(self) {
        self.client.shutdown().await;
        info!("MongoDB client closed");
    }
}

/// Mask the password portion of a connection string for safe logging.
fn mask_password(uri: &str) -> String {
    if let Some(at_pos) = uri.rfind('@') {
        let scheme_end = uri.find("://").map(|p| p + 3).unwrap_or(0);
        if let Some(colon_pos) = uri[..at_pos].rfind(':') {
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &uri[..colon_pos], &uri[at_pos + 1..]);
            }
        }
    }
    uri.to_string()
}
