//! API description endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::resource::ResourceDescriptor;

/// Path of the API docs endpoint.
pub const API_DOCS_PATH: &str = "/v2/api-docs";

/// Body of the API docs endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDocs {
    /// API title.
    pub title: String,
    /// Crate version.
    pub version: String,
    /// Every registered resource.
    pub resources: Vec<ResourceDescriptor>,
}

/// GET /v2/api-docs
pub async fn api_docs(State(resources): State<Arc<Vec<ResourceDescriptor>>>) -> Json<ApiDocs> {
    Json(ApiDocs {
        title: "CrudHub API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        resources: resources.as_ref().clone(),
    })
}
