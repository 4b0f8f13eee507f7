//! Integration tests for the monitor API endpoints

#[path = "../src/api.rs"]
#[allow(dead_code)]
mod api;

use api::{create_router, AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use monitor_lib::{
    collector::StatusBoard,
    health::{components, HealthRegistry},
    observability::MonitorMetrics,
    Analysis, Anomaly, Breach, GlobalStatus, Resource, ResourceAnalysis, TrendLabel,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceExt;

async fn setup_test_app() -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::COLLECTOR).await;
    health_registry.register(components::ANALYZER).await;
    health_registry.register(components::NOTIFIER).await;

    let state = Arc::new(AppState::new(health_registry, StatusBoard::new()));
    let router = create_router(state.clone());

    (router, state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_healthz_returns_ok_when_healthy() {
    let (app, _state) = setup_test_app().await;

    let (status, health) = get_json(app, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert!(health["components"]["collector"].is_object());
    assert!(health["components"]["notifier"].is_object());
}

#[tokio::test]
async fn test_healthz_returns_ok_when_degraded() {
    let (app, state) = setup_test_app().await;

    state
        .health_registry
        .set_degraded(components::NOTIFIER, "speaker offline")
        .await;

    let (status, health) = get_json(app, "/healthz").await;

    // Degraded still returns 200 (operational)
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "degraded");
    assert_eq!(
        health["components"]["notifier"]["message"],
        "speaker offline"
    );
}

#[tokio::test]
async fn test_healthz_returns_503_when_unhealthy() {
    let (app, state) = setup_test_app().await;

    state
        .health_registry
        .set_unhealthy(components::COLLECTOR, "No sensors readable")
        .await;

    let (status, health) = get_json(app, "/healthz").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["status"], "unhealthy");
}

#[tokio::test]
async fn test_readyz_returns_503_when_not_ready() {
    let (app, _state) = setup_test_app().await;

    // Not ready until the loop starts
    let (status, readiness) = get_json(app, "/readyz").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(readiness["ready"], false);
}

#[tokio::test]
async fn test_readyz_returns_ok_when_ready() {
    let (app, state) = setup_test_app().await;

    state.health_registry.set_ready(true).await;

    let (status, readiness) = get_json(app, "/readyz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(readiness["ready"], true);
}

#[tokio::test]
async fn test_readyz_returns_503_when_ready_but_unhealthy() {
    let (app, state) = setup_test_app().await;

    state.health_registry.set_ready(true).await;
    state
        .health_registry
        .set_unhealthy(components::ANALYZER, "Failed")
        .await;

    let (status, _) = get(app, "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let (app, _state) = setup_test_app().await;

    let metrics = MonitorMetrics::new();
    metrics.observe_tick_latency(0.001);
    metrics.observe_tick_latency(0.005);
    metrics.inc_alerts_emitted(GlobalStatus::Warning);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("skynotify_tick_latency_seconds_bucket"));
    assert!(metrics_text.contains("skynotify_ticks_total"));
    assert!(metrics_text.contains("skynotify_alerts_emitted_total{severity=\"warning\"}"));
    assert!(metrics_text.contains("skynotify_global_status"));
}

#[tokio::test]
async fn test_status_before_first_tick() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = get_json(app, "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["analysis"].is_null());
    assert_eq!(body["alerts"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_status_returns_latest_analysis() {
    let (app, state) = setup_test_app().await;

    let mut resources = BTreeMap::new();
    resources.insert(
        Resource::Cpu,
        ResourceAnalysis {
            current: 91.5,
            trend: TrendLabel::Increasing,
            anomaly: Anomaly {
                spike: true,
                breach: Breach::Critical,
            },
        },
    );
    state
        .board
        .publish_analysis(Analysis {
            generated_at: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
            resources,
            status: GlobalStatus::Critical,
            cause: Some(Resource::Cpu),
        })
        .await;

    let (status, body) = get_json(app, "/status").await;

    assert_eq!(status, StatusCode::OK);
    let analysis = &body["analysis"];
    assert_eq!(analysis["status"], "critical");
    assert_eq!(analysis["cause"], "cpu");
    assert_eq!(analysis["resources"]["cpu"]["current"], 91.5);
    assert_eq!(analysis["resources"]["cpu"]["trend"], "increasing");
    assert_eq!(analysis["resources"]["cpu"]["anomaly"]["breach"], "critical");
    assert!(analysis["resources"]["ram"].is_null());
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let (app, _state) = setup_test_app().await;
    let (status, _) = get(app, "/predictions").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
