//! Application builder: wires resources, shared endpoints, and middleware into an Axum app.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::info;

use crudhub_core::config::ServerConfig;
use crudhub_core::traits::Entity;

use crate::dto::ResourceDto;
use crate::handlers::docs::{API_DOCS_PATH, api_docs};
use crate::handlers::health::{HEALTH_PATH, health};
use crate::mapper::DtoMapper;
use crate::middleware::cors::CorsPolicy;
use crate::middleware::logging::request_logging;
use crate::resource::{Resource, ResourceDescriptor};

/// Collects resources and builds the complete application router.
#[derive(Debug)]
pub struct ApiBuilder {
    server: ServerConfig,
    routes: Router,
    descriptors: Vec<ResourceDescriptor>,
}

impl ApiBuilder {
    /// Starts an application with no resources.
    pub fn new(server: &ServerConfig) -> Self {
        Self {
            server: server.clone(),
            routes: Router::new(),
            descriptors: Vec::new(),
        }
    }

    /// Mounts a resource.
    pub fn resource<E, D, M>(mut self, resource: Resource<E, D, M>) -> Self
    where
        E: Entity,
        D: ResourceDto,
        M: DtoMapper<E, D>,
    {
        info!(entity = E::NAME, path = resource.base_path(), "Registering resource");
        self.descriptors.push(resource.descriptor());
        self.routes = self.routes.merge(resource.into_router());
        self
    }

    /// Builds the router with health, API docs, and the middleware stack.
    pub fn build(self) -> Router {
        let docs = Router::new()
            .route(API_DOCS_PATH, get(api_docs))
            .with_state(Arc::new(self.descriptors));

        let app = self
            .routes
            .route(HEALTH_PATH, get(health))
            .merge(docs)
            .layer(DefaultBodyLimit::max(self.server.max_upload_bytes))
            .layer(axum_middleware::from_fn(request_logging))
            .layer(TraceLayer::new_for_http());

        match CorsPolicy::from_config(&self.server.cors) {
            Some(policy) => {
                info!(paths = ?policy.registered_paths(), "CORS policy registered");
                app.layer(policy.layer())
            }
            None => app,
        }
    }
}
