//! CORS policy built from configuration.

use std::time::Duration;

use axum::http::header::{HeaderName, LOCATION};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crudhub_core::config::CorsConfig;

use crate::handlers::docs::API_DOCS_PATH;
use crate::resource::TOTAL_COUNT_HEADER;

/// Path pattern covering every route.
pub const ALL_PATHS: &str = "/**";

const WILDCARD: &str = "*";

/// A configured CORS policy and the paths it is registered for.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    config: CorsConfig,
}

impl CorsPolicy {
    /// `None` when no origins are allowed, so no policy is registered.
    pub fn from_config(config: &CorsConfig) -> Option<Self> {
        if config.allowed_origins.is_empty() {
            return None;
        }
        Some(Self {
            config: config.clone(),
        })
    }

    /// Path patterns the policy applies to.
    pub fn registered_paths(&self) -> &'static [&'static str] {
        &[ALL_PATHS, API_DOCS_PATH]
    }

    /// Builds the tower layer for this policy.
    pub fn layer(&self) -> CorsLayer {
        let config = &self.config;
        let any_origin = config.allowed_origins.iter().any(|o| o == WILDCARD);
        let any_header = config.allowed_headers.iter().any(|h| h == WILDCARD);

        let mut layer = CorsLayer::new();

        // Origins
        if any_origin {
            layer = layer.allow_origin(Any);
        } else {
            let origins: Vec<HeaderValue> = config
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            layer = layer.allow_origin(origins);
        }

        // Methods
        let methods: Vec<Method> = config
            .allowed_methods
            .iter()
            .filter_map(|m| m.parse().ok())
            .collect();
        layer = layer.allow_methods(methods);

        // Headers
        if any_header {
            layer = layer.allow_headers(Any);
        } else {
            let headers: Vec<HeaderName> = config
                .allowed_headers
                .iter()
                .filter_map(|h| h.parse().ok())
                .collect();
            layer = layer.allow_headers(headers);
        }

        layer = layer.expose_headers([HeaderName::from_static(TOTAL_COUNT_HEADER), LOCATION]);

        // Credentials cannot be combined with wildcards.
        if config.allow_credentials {
            if any_origin || any_header {
                warn!("CORS allow_credentials ignored because origins or headers are wildcards");
            } else {
                layer = layer.allow_credentials(true);
            }
        }

        layer.max_age(Duration::from_secs(config.max_age_seconds))
    }
}

/// Paths a CORS policy is registered for under `config`; empty when disabled.
pub fn registered_paths(config: &CorsConfig) -> Vec<&'static str> {
    CorsPolicy::from_config(config)
        .map(|policy| policy.registered_paths().to_vec())
        .unwrap_or_default()
}
