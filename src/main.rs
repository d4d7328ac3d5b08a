//! CrudHub Server: generic CRUD REST API over MongoDB.
//!
//! Main entry point that wires all crates together and starts the server.

mod domain;

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use crudhub_api::tenant::{TENANTS_PATH, TenantMapper};
use crudhub_api::{ApiBuilder, Resource};
use crudhub_auth::{JwtVerifier, TokenVerifier};
use crudhub_core::config::{AppConfig, LoggingConfig};
use crudhub_core::error::AppError;
use crudhub_database::{MongoConnection, MongoRepository};
use crudhub_entity::Tenant;
use crudhub_service::CrudService;

use crate::domain::contact::{CONTACTS_PATH, Contact, ContactMapper};

#[tokio::main]
async fn main() {
    let env = AppConfig::environment();
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `logging.level`.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.format.eq_ignore_ascii_case("json") {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_target(true)
            .init();
    } else {
        fmt().pretty().with_env_filter(filter).with_target(false).init();
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CrudHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Database ─────────────────────────────────────────────────
    let connection = MongoConnection::connect(&config.database).await?;

    // ── Auth ─────────────────────────────────────────────────────
    let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtVerifier::new(&config.auth));

    // ── Resources ────────────────────────────────────────────────
    let tenants = Resource::new(
        TENANTS_PATH,
        CrudService::new(Arc::new(MongoRepository::<Tenant>::new(&connection)?)),
        TenantMapper,
        Arc::clone(&verifier),
    );
    let contacts = Resource::new(
        CONTACTS_PATH,
        CrudService::new(Arc::new(MongoRepository::<Contact>::new(&connection)?)),
        ContactMapper,
        verifier,
    );

    let app = ApiBuilder::new(&config.server)
        .resource(tenants)
        .resource(contacts)
        .build();

    // ── HTTP server ──────────────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("CrudHub server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    connection.close().await;
    tracing::info!("CrudHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
