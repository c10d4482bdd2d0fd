//! Integration tests for the JSON error envelope.

mod common;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use common::{admin_token, body_json, get, get_auth, post_raw_json_auth, put_json_auth};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn errors_use_error_and_code_fields(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/event_code/AUTH0001").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );

    let json = body_json(response).await;
    let fields: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(fields, vec!["code", "error"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_missing_event_code_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let id = uuid::Uuid::new_v4();

    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/event-codes/{id}"),
        serde_json::json!({ "hint": "x" }),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], format!("EventCode '{id}' is not found."));
}

async fn assert_bad_request_envelope(response: Response<Body>) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(!json["error"].as_str().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_path_id_uses_envelope(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/event-codes/not-a-uuid", &admin_token()).await;
    assert_bad_request_envelope(response).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_query_uses_envelope(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/admin/prefixes?limit=lots", &admin_token()).await;
    assert_bad_request_envelope(response).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_json_body_uses_envelope(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_raw_json_auth(
        app,
        "/api/v1/admin/prefixes",
        r#"{"prefix": "AUTH", "#,
        &admin_token(),
    )
    .await;
    assert_bad_request_envelope(response).await;
}
