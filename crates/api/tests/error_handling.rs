//! Tests for `AppError` and `Reply` → HTTP response mapping.
//!
//! These tests do NOT need an HTTP server or a database -- they call
//! `IntoResponse` directly.

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use plans_api::error::AppError;
use plans_api::response::Reply;
use plans_catalog::CatalogError;
use plans_core::error::CoreError;
use plans_core::plan::parse_id_list;

/// Helper: convert a response into its status code and raw body bytes.
async fn into_parts(response: axum::response::Response) -> (StatusCode, Vec<u8>) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let (status, bytes) = into_parts(err.into_response()).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_returns_400() {
    let (status, json) = error_to_response(AppError::BadRequest("Missing parameter 'lang'".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["message"], "Bad request: Missing parameter 'lang'");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::from(parse_id_list("a,b").unwrap_err());
    assert_matches!(err, AppError::Core(CoreError::Validation(_)));

    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("Invalid id 'a'"));
}

#[tokio::test]
async fn store_error_returns_500_and_sanitizes_message() {
    let err = AppError::Store {
        operation: "create plan",
        source: sqlx::Error::PoolTimedOut,
    };

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["message"], "Internal error");
}

#[tokio::test]
async fn catalog_error_returns_502_invalid_data() {
    let err = AppError::catalog("get plans")(CatalogError::ApiError {
        status: 503,
        body: "maintenance".into(),
    });
    assert_matches!(err, AppError::Catalog { operation: "get plans", .. });

    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert_eq!(json["message"], "Invalid data");
}

#[tokio::test]
async fn upstream_timeout_returns_504() {
    let (status, json) = error_to_response(AppError::UpstreamTimeout("get plan")).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["code"], "UPSTREAM_TIMEOUT");
}

#[test]
fn store_helper_keeps_operation_label() {
    let err = AppError::store("release plan")(sqlx::Error::RowNotFound);
    assert_matches!(err, AppError::Store { operation: "release plan", .. });
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn data_reply_is_wrapped_in_envelope() {
    let (status, bytes) = into_parts(Reply::Data(vec![5]).into_response()).await;
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "status": 200, "message": "Success", "data": [5] }));
}

#[tokio::test]
async fn no_content_and_not_modified_have_empty_bodies() {
    let (status, bytes) = into_parts(Reply::<()>::NoContent.into_response()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(bytes.is_empty());

    let (status, bytes) = into_parts(Reply::<()>::NotModified.into_response()).await;
    assert_eq!(status, StatusCode::NOT_MODIFIED);
    assert!(bytes.is_empty());
}
