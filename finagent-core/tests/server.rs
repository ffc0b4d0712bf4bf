mod common;

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use common::{MockConnector, ScriptedModel, StaticToken};
use finagent_core::InvocationHandler;
use finagent_core::server::create_router;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

async fn router(workspace: &TempDir, model: Arc<ScriptedModel>) -> axum::Router {
    let context = common::context(
        workspace,
        Arc::new(StaticToken),
        MockConnector::Refused,
        model,
    )
    .await;
    create_router(InvocationHandler::new(context))
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn invocation(body: &str) -> Request<Body> {
    Request::post("/invocations")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn ping_reports_healthy() {
    let workspace = TempDir::new().unwrap();
    let app = router(&workspace, ScriptedModel::new(Vec::new())).await;

    let response = app
        .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "Healthy"}));
}

#[tokio::test]
async fn invocation_returns_result_message() {
    let workspace = TempDir::new().unwrap();
    let app = router(&workspace, ScriptedModel::replying("Hello from the agent")).await;

    let response = app
        .oneshot(invocation(r#"{"prompt": "hi"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "result": {
                "role": "assistant",
                "content": [{"text": "Hello from the agent"}]
            }
        })
    );
}

#[tokio::test]
async fn agent_failure_is_a_server_error() {
    let workspace = TempDir::new().unwrap();
    let app = router(&workspace, ScriptedModel::new(Vec::new())).await;

    let response = app.oneshot(invocation("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("model unavailable")
    );
}

#[tokio::test]
async fn malformed_body_is_rejected_by_extractor() {
    let workspace = TempDir::new().unwrap();
    let app = router(&workspace, ScriptedModel::new(Vec::new())).await;

    let response = app.oneshot(invocation("{not json")).await.unwrap();
    assert!(response.status().is_client_error());
}
