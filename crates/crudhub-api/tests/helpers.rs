//! Shared test helpers for resource integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use crudhub_api::tenant::{TENANTS_PATH, TenantMapper};
use crudhub_api::{ApiBuilder, Resource};
use crudhub_auth::{JwtEncoder, JwtVerifier, TokenVerifier};
use crudhub_core::config::{AuthConfig, ServerConfig};
use crudhub_database::{MemoryRepository, MemoryStore};
use crudhub_entity::Tenant;
use crudhub_service::CrudService;

/// Multipart boundary used by [`TestApp::upload`].
const BOUNDARY: &str = "crudhub-test-boundary";

/// Test application backed by an in-memory store.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for direct inspection
    pub store: MemoryStore,
    /// Issues bearer tokens accepted by the app
    pub encoder: JwtEncoder,
}

/// Response captured by the helpers.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub bytes: Vec<u8>,
    /// Parsed JSON body, `Null` when not JSON
    pub body: Value,
}

impl TestResponse {
    /// A header value as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    /// Create a test application with default server settings.
    pub fn new() -> Self {
        Self::with_server(ServerConfig::default())
    }

    /// Create a test application with the given server settings.
    pub fn with_server(server: ServerConfig) -> Self {
        let auth = AuthConfig::default();
        let store = MemoryStore::new();
        let repo = MemoryRepository::<Tenant>::new(store.clone()).expect("valid tenant metadata");
        let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtVerifier::new(&auth));

        let tenants = Resource::new(
            TENANTS_PATH,
            CrudService::new(Arc::new(repo)),
            TenantMapper,
            verifier,
        );

        let router = ApiBuilder::new(&server).resource(tenants).build();

        Self {
            router,
            store,
            encoder: JwtEncoder::new(&auth),
        }
    }

    /// Send a JSON request.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Send a GET with extra headers.
    pub async fn get_with(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut req = Request::builder().method("GET").uri(path);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let req = req.body(Body::empty()).expect("Failed to build request");
        self.send(req).await
    }

    /// Upload `bytes` as multipart part `part` to `path`.
    pub async fn upload(&self, path: &str, part: &str, bytes: &[u8]) -> TestResponse {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{part}\"; filename=\"upload.xlsx\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Create a tenant and return its id.
    pub async fn create_tenant(&self, name: &str, code: &str) -> String {
        let response = self
            .request(
                "POST",
                TENANTS_PATH,
                Some(serde_json::json!({ "name": name, "code": code })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["id"]
            .as_str()
            .expect("created tenant has an id")
            .to_string()
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body")
            .to_vec();
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}
