use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use keyexpiry_application::{ManagementApi, RotationSettings};
use keyexpiry_domain::{ApiProductRef, Credential, DeveloperApp, ResourcePath};
use keyexpiry_infrastructure::InMemoryManagementApi;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api_router::build_router;
use crate::state::AppState;

use super::audit_event_handler;

const APP_PATH: &str = "organizations/org1/developers/dev1@example.com/apps/app1";

fn app_path() -> ResourcePath {
    let path = ResourcePath::new(APP_PATH);
    assert!(path.is_ok());
    path.unwrap_or_else(|_| unreachable!())
}

async fn seeded_api() -> Arc<InMemoryManagementApi> {
    let api = Arc::new(InMemoryManagementApi::new());
    api.put_app(
        &app_path(),
        &DeveloperApp::new(
            "app1",
            vec![
                Credential::new("NeverExpiringKey01", "secret", "approved")
                    .with_expires_at(-1)
                    .with_api_products(vec![ApiProductRef::new("gold", "approved")]),
            ],
        ),
    )
    .await;
    api
}

fn app_state(api: Arc<InMemoryManagementApi>) -> AppState {
    let management_api: Arc<dyn ManagementApi> = api;
    AppState::new(
        management_api,
        RotationSettings::new(3_600, Duration::ZERO),
    )
}

fn event(method_name: &str, request: Value) -> Bytes {
    Bytes::from(
        json!({
            "protoPayload": {
                "methodName": method_name,
                "request": request,
            }
        })
        .to_string(),
    )
}

async fn send(state: AppState, body: Bytes) -> (StatusCode, Value) {
    let response = audit_event_handler(State(state), Ok(body))
        .await
        .into_response();
    read_json(response).await
}

async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await;
    assert!(bytes.is_ok());
    let bytes = bytes.unwrap_or_else(|_| unreachable!());
    let value = serde_json::from_slice::<Value>(&bytes);
    assert!(value.is_ok());

    (status, value.unwrap_or_else(|_| unreachable!()))
}

#[tokio::test]
async fn create_app_event_rotates_never_expiring_key() {
    let api = seeded_api().await;
    let state = app_state(api.clone());

    let (status, body) = send(
        state,
        event(
            "google.cloud.apigee.v1.DeveloperApps.CreateDeveloperApp",
            json!({
                "parent": "organizations/org1/developers/dev1@example.com",
                "developerApp": {"name": "app1"},
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "complete"}));

    let app = api.get_developer_app(&app_path()).await;
    assert!(app.is_ok());
    let app = app.unwrap_or_else(|_| unreachable!());
    let credential = &app.credentials()[0];
    assert_eq!(credential.consumer_key(), "NeverExpiringKey01");
    assert!(credential.has_expiration());
    assert_eq!(credential.api_products()[0].name(), "gold");
    assert_eq!(credential.api_products()[0].status(), "approved");
}

#[tokio::test]
async fn update_key_event_resolves_app_from_key_name() {
    let api = seeded_api().await;

    let (status, body) = send(
        app_state(api.clone()),
        event(
            "google.cloud.apigee.v1.DeveloperAppKeys.UpdateDeveloperAppKey",
            json!({"name": format!("{APP_PATH}/keys/NeverExpiringKey01")}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "complete");
}

#[tokio::test]
async fn rotation_failures_still_complete() {
    let api = seeded_api().await;
    api.fail_creates_for("NeverExpiringKey01").await;

    let (status, body) = send(
        app_state(api.clone()),
        event(
            "google.cloud.apigee.v1.DeveloperApps.UpdateDeveloperApp",
            json!({"name": APP_PATH}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "complete");
}

#[tokio::test]
async fn unsupported_method_is_bad_request() {
    let (status, body) = send(
        app_state(seeded_api().await),
        event(
            "google.cloud.apigee.v1.DeveloperApps.DeleteDeveloperApp",
            json!({"name": APP_PATH}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "method DeleteDeveloperApp not supported");
}

#[tokio::test]
async fn unparsable_body_is_bad_request() {
    let (status, _body) = send(
        app_state(seeded_api().await),
        Bytes::from_static(b"not json"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unresolvable_path_is_bad_request() {
    let (status, _body) = send(
        app_state(seeded_api().await),
        event(
            "google.cloud.apigee.v1.DeveloperApps.UpdateDeveloperApp",
            json!({}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_app_is_bad_request_with_lookup_message() {
    let (status, body) = send(
        app_state(seeded_api().await),
        event(
            "google.cloud.apigee.v1.DeveloperApps.UpdateDeveloperApp",
            json!({"name": "organizations/org1/developers/dev1@example.com/apps/missing"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap_or_default();
    assert!(message.starts_with("could not find app. "));
}

#[tokio::test]
async fn health_reports_ok() {
    let response = crate::handlers::health::health_handler().await.into_response();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unreadable_body_is_internal_error() {
    let chunks = futures::stream::iter(vec![
        Ok::<Bytes, std::io::Error>(Bytes::from_static(b"{\"protoPayload\":")),
        Err(std::io::Error::other("connection reset by peer")),
    ]);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from_stream(chunks));
    assert!(request.is_ok());
    let request = request.unwrap_or_else(|_| unreachable!());

    let response = build_router(app_state(seeded_api().await))
        .oneshot(request)
        .await;
    assert!(response.is_ok());
    let (status, body) = read_json(response.unwrap_or_else(|_| unreachable!())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["message"].as_str().unwrap_or_default();
    assert!(
        message.starts_with("internal error: failed to read request body"),
        "{message}"
    );
}
