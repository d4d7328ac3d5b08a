//! Integration tests for the shared endpoints and middleware.

mod helpers;

use axum::http::StatusCode;

use crudhub_core::config::{CorsConfig, ServerConfig};

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert!(response.body["version"].is_string());
}

#[tokio::test]
async fn test_api_docs_lists_resources() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/v2/api-docs", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let resources = response.body["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0]["name"], "Tenant");
    assert_eq!(resources[0]["base_path"], "/api/tenants");
    assert_eq!(resources[0]["endpoints"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_cors_disabled_without_origins() {
    let app = helpers::TestApp::new();

    let response = app
        .get_with("/api/health", &[("Origin", "http://x")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let server = ServerConfig {
        cors: CorsConfig {
            allowed_origins: vec!["http://x".to_string()],
            ..Default::default()
        },
        ..Default::default()
    };
    let app = helpers::TestApp::with_server(server);

    let response = app
        .get_with("/v2/api-docs", &[("Origin", "http://x")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("access-control-allow-origin"), Some("http://x"));
}
