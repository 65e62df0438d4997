//! Integration tests for scorpia-gateway: ingest, diagnostic and error mapping

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use scorpia_core::Kernel;
use scorpia_gateway::{router, GatewayState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> (Router, Arc<GatewayState>) {
    let state = GatewayState::new(Kernel::seeded(42).unwrap());
    (router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ============================================================
// Liveness
// ============================================================

#[tokio::test]
async fn root_reports_online() {
    let (app, _) = app();
    let (status, json) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ONLINE");
}

#[tokio::test]
async fn health_counts_frames() {
    let (app, _) = app();
    let (_, json) = send(&app, get("/health")).await;
    assert_eq!(json["frames"], 0);

    send(&app, post_json("/ingest", r#"{"signal":[0.9,0.5,0.2,0.95]}"#)).await;
    let (_, json) = send(&app, get("/health")).await;
    assert_eq!(json["frames"], 1);
}

// ============================================================
// Ingest
// ============================================================

#[tokio::test]
async fn ingest_named_channels_runs_one_frame() {
    let (app, state) = app();
    let body = r#"{"auditory":0.9,"visual":0.5,"proprioceptive":0.2,"social":0.95}"#;
    let (status, json) = send(&app, post_json("/ingest", body)).await;
    assert_eq!(status, StatusCode::OK);

    let metric = json["current_error_metric"].as_f64().unwrap();
    assert!(metric >= 0.0);
    assert_eq!(json["plasticity_active"].as_bool().unwrap(), metric > 15.0);
    assert_eq!(json["homeostasis_index"], 1.0);
    assert_eq!(json["frames"], 1);
    assert_eq!(state.kernel.lock().await.frames(), 1);
}

#[tokio::test]
async fn ingest_matches_direct_kernel() {
    let (app, _) = app();
    let mut reference = Kernel::seeded(42).unwrap();
    for _ in 0..3 {
        let (_, json) = send(&app, post_json("/ingest", r#"{"signal":[0.9,0.5,0.2,0.95]}"#)).await;
        let expected = reference.ingest(&[0.9, 0.5, 0.2, 0.95]).unwrap();
        let metric = json["current_error_metric"].as_f64().unwrap();
        assert!((metric - expected.current_error_metric).abs() < 1e-9);
    }
}

#[tokio::test]
async fn ingest_wrong_shape_is_rejected_without_a_frame() {
    let (app, state) = app();
    let (status, json) = send(&app, post_json("/ingest", r#"{"signal":[0.9,0.5,0.2]}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("expected 4"));
    assert_eq!(state.kernel.lock().await.frames(), 0);
}

#[tokio::test]
async fn ingest_malformed_body_is_client_error() {
    let (app, _) = app();
    let (status, _) = send(&app, post_json("/ingest", r#"{"auditory":"loud"}"#)).await;
    assert!(status.is_client_error());
}

// ============================================================
// Diagnostic
// ============================================================

#[tokio::test]
async fn diagnostic_is_read_only() {
    let (app, state) = app();
    send(&app, post_json("/ingest", r#"{"signal":[0.9,0.5,0.2,0.95]}"#)).await;

    let (status, first) = send(&app, get("/diagnostic")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = send(&app, get("/diagnostic")).await;
    assert_eq!(first, second);

    assert_eq!(first["synaptic_weights"].as_array().unwrap().len(), 64);
    assert_eq!(first["predictive_priors"].as_array().unwrap().len(), 64);
    assert_eq!(state.kernel.lock().await.frames(), 1);
}
