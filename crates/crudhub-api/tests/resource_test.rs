//! Integration tests for the generic REST resource.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use crudhub_api::tenant::TenantDto;
use crudhub_excel::{EXCEL_MEDIA_TYPE, ExcelService};

#[tokio::test]
async fn test_create_returns_location() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/tenants",
            Some(json!({ "name": "Acme", "code": "ACME" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["id"].as_str().unwrap();
    assert_eq!(
        response.header("location"),
        Some(format!("/api/tenants/{id}").as_str())
    );
    assert_eq!(response.body["active"], true);
    assert_eq!(response.body["created_by"], "unknown");

    let fetched = app.request("GET", &format!("/api/tenants/{id}"), None, None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["name"], "Acme");
}

#[tokio::test]
async fn test_create_with_id_rejected() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/tenants",
            Some(json!({ "id": "64b000000000000000000001", "name": "Acme", "code": "ACME" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_create_invalid_dto_rejected() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/tenants",
            Some(json!({ "name": "", "code": "ACME" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_update_requires_id() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "PUT",
            "/api/tenants",
            Some(json!({ "name": "Acme", "code": "ACME" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_keeps_creation_stamp() {
    let app = helpers::TestApp::new();
    let token = app.encoder.issue("1", Some("alice")).unwrap();

    let created = app
        .request(
            "POST",
            "/api/tenants",
            Some(json!({ "name": "Acme", "code": "ACME" })),
            Some(&token),
        )
        .await;
    let id = created.body["id"].as_str().unwrap().to_string();
    assert_eq!(created.body["created_by"], "alice");

    let token = app.encoder.issue("2", Some("bob")).unwrap();
    let updated = app
        .request(
            "PUT",
            "/api/tenants",
            Some(json!({ "id": id, "name": "Acme Corp", "code": "ACME" })),
            Some(&token),
        )
        .await;

    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["name"], "Acme Corp");
    assert_eq!(updated.body["created_by"], "alice");
    assert_eq!(updated.body["last_modified_by"], "bob");
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/tenants",
            Some(json!({ "name": "Acme", "code": "ACME" })),
            Some("not-a-jwt"),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.stored_count("tenants").await, 0);
}

#[tokio::test]
async fn test_list_paged_with_total_count() {
    let app = helpers::TestApp::new();
    for (name, code) in [("beta", "B"), ("Alpha", "A"), ("gamma", "G")] {
        app.create_tenant(name, code).await;
    }

    let response = app
        .request("GET", "/api/tenants?page=1&size=2&sort=name,asc", None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-total-count"), Some("3"));
    assert_eq!(response.body["total_items"], 3);
    assert_eq!(response.body["total_pages"], 2);
    assert_eq!(response.body["has_next"], true);
    let names: Vec<_> = response.body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "beta"]);
}

#[tokio::test]
async fn test_list_all_returns_array() {
    let app = helpers::TestApp::new();
    app.create_tenant("Alpha", "A").await;
    app.create_tenant("Beta", "B").await;

    let response = app
        .request("GET", "/api/tenants?all=true&sort=name,desc", None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-total-count"), Some("2"));
    let items = response.body.as_array().unwrap();
    assert_eq!(items[0]["name"], "Beta");
    assert_eq!(items[1]["name"], "Alpha");
}

#[tokio::test]
async fn test_search_matches_substring() {
    let app = helpers::TestApp::new();
    app.create_tenant("Foobar Ltd", "FB").await;
    app.create_tenant("Other", "XFOO").await;
    app.create_tenant("Nothing", "N").await;

    let response = app
        .request("GET", "/api/tenants?search=foo&all=true", None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 2);

    let paged = app.request("GET", "/api/tenants?search=foo&size=1", None, None).await;
    assert_eq!(paged.body["total_items"], 2);
    assert_eq!(paged.body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_sort_key_rejected() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/tenants?sort=nope", None, None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_is_soft() {
    let app = helpers::TestApp::new();
    let id = app.create_tenant("Acme", "ACME").await;

    let deleted = app
        .request("DELETE", &format!("/api/tenants/{id}"), None, None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let list = app.request("GET", "/api/tenants", None, None).await;
    assert_eq!(list.body["total_items"], 0);

    let fetched = app.request("GET", &format!("/api/tenants/{id}"), None, None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["active"], false);
    assert_eq!(app.store.stored_count("tenants").await, 1);
}

#[tokio::test]
async fn test_update_without_active_keeps_deleted() {
    let app = helpers::TestApp::new();
    let id = app.create_tenant("Acme", "ACME").await;
    app.request("DELETE", &format!("/api/tenants/{id}"), None, None)
        .await;

    let updated = app
        .request(
            "PUT",
            "/api/tenants",
            Some(json!({ "id": id, "name": "Acme Ltd", "code": "ACME" })),
            None,
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["active"], false);
    assert_eq!(updated.body["name"], "Acme Ltd");

    let list = app.request("GET", "/api/tenants", None, None).await;
    assert_eq!(list.body["total_items"], 0);

    let restored = app
        .request(
            "PUT",
            "/api/tenants",
            Some(json!({ "id": id, "name": "Acme Ltd", "code": "ACME", "active": true })),
            None,
        )
        .await;
    assert_eq!(restored.body["active"], true);
    let list = app.request("GET", "/api/tenants", None, None).await;
    assert_eq!(list.body["total_items"], 1);
}

#[tokio::test]
async fn test_search_skips_deleted() {
    let app = helpers::TestApp::new();
    let id = app.create_tenant("Acme Foods", "AF").await;
    app.create_tenant("Best Foods", "BF").await;
    app.request("DELETE", &format!("/api/tenants/{id}"), None, None)
        .await;

    let response = app
        .request("GET", "/api/tenants?search=foods", None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total_items"], 1);
    assert_eq!(response.body["items"][0]["name"], "Best Foods");
}

#[tokio::test]
async fn test_huge_page_number_is_empty() {
    let app = helpers::TestApp::new();
    app.create_tenant("Acme", "ACME").await;

    let response = app
        .request("GET", "/api/tenants?page=18446744073709551615", None, None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["items"].as_array().unwrap().is_empty());
    assert_eq!(response.body["total_items"], 1);
    assert_eq!(response.header("x-total-count"), Some("1"));
}

#[tokio::test]
async fn test_missing_ids_are_not_found() {
    let app = helpers::TestApp::new();

    let fetched = app.request("GET", "/api/tenants/missing", None, None).await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);

    let deleted = app.request("DELETE", "/api/tenants/missing", None, None).await;
    assert_eq!(deleted.status, StatusCode::NOT_FOUND);
    assert_eq!(deleted.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_export_excel() {
    let app = helpers::TestApp::new();
    app.create_tenant("Acme", "ACME").await;

    let response = app
        .get_with("/api/tenants?all=true", &[("Accept", EXCEL_MEDIA_TYPE)])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some(EXCEL_MEDIA_TYPE));
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"Tenant.xlsx\"")
    );

    let rows: Vec<TenantDto> = ExcelService::new()
        .read_excel(&response.bytes, "Tenant")
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Acme");
}

#[tokio::test]
async fn test_reimport_updates_in_place() {
    let app = helpers::TestApp::new();
    app.create_tenant("Acme", "ACME").await;
    app.create_tenant("Globex", "GLX").await;

    let export = app
        .get_with("/api/tenants?all=true", &[("Accept", EXCEL_MEDIA_TYPE)])
        .await;
    let response = app.upload("/api/tenants/excel", "file", &export.bytes).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 2);
    assert_eq!(app.store.stored_count("tenants").await, 2);
}

#[tokio::test]
async fn test_import_creates_new_rows() {
    let app = helpers::TestApp::new();
    let bytes = ExcelService::new()
        .create_excel(&[TenantDto::new("Initech", "INI")], "Tenant")
        .unwrap();

    let response = app.upload("/api/tenants/excel", "file", &bytes).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body[0]["id"].as_str().is_some());
    assert_eq!(app.store.stored_count("tenants").await, 1);
}

#[tokio::test]
async fn test_import_without_file_part() {
    let app = helpers::TestApp::new();

    let response = app.upload("/api/tenants/excel", "other", b"data").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_import_unreadable_workbook() {
    let app = helpers::TestApp::new();

    let response = app.upload("/api/tenants/excel", "file", b"not a workbook").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "EXCEL_ERROR");
}
