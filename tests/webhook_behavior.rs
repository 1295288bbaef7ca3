//! Behavior-driven tests for the web delivery adapters.
//!
//! Exercises the axum router directly with `tower::ServiceExt::oneshot`:
//! the JSON endpoints, their 502 policy, and the always-answering WhatsApp
//! webhook.

use relevo_tests::{auth_ok, demo_config, offline_config, Arc, ScriptedHttpClient};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use relevo_core::{HttpResponse, RelayConfig, RelayService};
use relevo_web::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(client: ScriptedHttpClient, config: RelayConfig) -> axum::Router {
    let state = AppState {
        relay: Arc::new(RelayService::new(Arc::new(client), config)),
    };
    router(state)
}

fn activities_fixture() -> Result<HttpResponse, relevo_core::HttpError> {
    let body = json!({
        "message": "Consulta exitosa",
        "data": {"information": [{"dataField": "31", "descriptionField": "Retail"}]},
    });
    Ok(HttpResponse::ok_json(body.to_string()))
}

async fn read_body(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
}

fn webhook_request(form_body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook/whatsapp")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form_body))
        .expect("request should build")
}

// =============================================================================
// JSON API
// =============================================================================

#[tokio::test]
async fn api_data_returns_the_normalized_result_as_json() {
    let app = app(
        ScriptedHttpClient::new(vec![auth_ok(), activities_fixture()]),
        offline_config(),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/data")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&read_body(response).await).expect("body is JSON");
    assert_eq!(body["source"], json!("live"));
    assert_eq!(body["status"], json!("success"));
    assert_eq!(body["data"]["information"][0]["dataField"], json!("31"));
}

#[tokio::test]
async fn api_data_surfaces_fallback_exhaustion_as_502() {
    let app = app(ScriptedHttpClient::unreachable(), offline_config());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/data")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_str(&read_body(response).await).expect("body is JSON");
    assert!(body["error"]
        .as_str()
        .expect("error message present")
        .contains("no fallback available"));
}

#[tokio::test]
async fn api_client_serves_the_demo_branch_in_demo_mode() {
    let app = app(ScriptedHttpClient::unreachable(), demo_config());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/client/900959500")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&read_body(response).await).expect("body is JSON");
    assert_eq!(body["source"], json!("demo_found"));
    assert_eq!(body["status"], json!("success"));
    assert_eq!(body["data"]["nit"], json!("900959500"));
}

// =============================================================================
// WhatsApp webhook
// =============================================================================

#[tokio::test]
async fn when_the_code_matches_an_activity_the_reply_contains_its_description() {
    let app = app(
        ScriptedHttpClient::new(vec![auth_ok(), activities_fixture()]),
        offline_config(),
    );

    let response = app
        .oneshot(webhook_request("Body=31&From=whatsapp%3A%2B573001112233"))
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/xml")
    );
    let body = read_body(response).await;
    assert!(body.contains("<Response><Message>"));
    assert!(body.contains("Retail"));
}

#[tokio::test]
async fn when_the_code_is_unknown_the_reply_uses_the_not_found_template() {
    let app = app(
        ScriptedHttpClient::new(vec![auth_ok(), activities_fixture()]),
        offline_config(),
    );

    let response = app
        .oneshot(webhook_request("Body=99&From=whatsapp%3A%2B573001112233"))
        .await
        .expect("router should respond");

    let body = read_body(response).await;
    assert!(body.contains("no encontré ninguna actividad"));
    assert!(body.contains("*99*"));
}

#[tokio::test]
async fn a_missing_body_field_is_treated_as_an_empty_code() {
    let app = app(
        ScriptedHttpClient::new(vec![auth_ok(), activities_fixture()]),
        offline_config(),
    );

    let response = app
        .oneshot(webhook_request("From=whatsapp%3A%2B573001112233"))
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_body(response).await;
    assert!(body.contains("no encontré ninguna actividad"));
}

#[tokio::test]
async fn pipeline_failures_become_the_apology_reply_never_an_http_error() {
    // Given: no live upstream and no fallback of any kind
    let app = app(ScriptedHttpClient::unreachable(), offline_config());

    // When: a message arrives
    let response = app
        .oneshot(webhook_request("Body=31&From=whatsapp%3A%2B573001112233"))
        .await
        .expect("router should respond");

    // Then: the chat channel still gets a well-formed reply
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_body(response).await;
    assert!(body.contains("<Response><Message>"));
    assert!(body.contains("problemas para consultar"));
}
