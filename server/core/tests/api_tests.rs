// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Router-level integration tests over the in-memory repositories:
//! the REST contract, status-code mapping, the cached agent counter, and
//! broadcast fan-out through real mutation requests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use swarmware_core::application::dashboard::DashboardService;
use swarmware_core::domain::repository::{ApiCallRepository, AppStateStore};
use swarmware_core::infrastructure::event_bus::EventBus;
use swarmware_core::infrastructure::repositories::InMemoryStore;
use swarmware_core::presentation::api::{router, AppContext};

fn test_context() -> (AppContext, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let dashboard = Arc::new(DashboardService::new(
        store.clone(),
        store.clone(),
        store.clone(),
    ));
    let ctx = AppContext {
        users: store.clone(),
        swarms: store.clone(),
        agents: store.clone(),
        templates: store.clone(),
        alerts: store.clone(),
        api_calls: store.clone(),
        app_state: store.clone(),
        dashboard,
        events: EventBus::with_default_capacity(),
    };
    (ctx, store)
}

fn test_app() -> (Router, AppContext, Arc<InMemoryStore>) {
    let (ctx, store) = test_context();
    (router(ctx.clone()), ctx, store)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn alpha_payload() -> Value {
    json!({
        "name": "Alpha",
        "ownerId": "demo-user",
        "status": "active",
        "agentCount": 5,
        "maxAgents": 50,
    })
}

#[tokio::test]
async fn created_swarm_is_listed_with_a_zero_agent_counter() {
    let (app, _, _) = test_app();

    let (status, swarm) = send(&app, "POST", "/api/swarms", Some(alpha_payload())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(swarm["id"].is_string());
    assert_eq!(swarm["name"], "Alpha");
    // the agentCount hint in the payload never seeds the cached counter
    assert_eq!(swarm["agentCount"], 0);

    let (status, listed) = send(&app, "GET", "/api/swarms?userId=demo-user", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "Alpha");
    assert_eq!(listed[0]["agentCount"], 0);
}

#[tokio::test]
async fn owner_scoped_reads_require_a_user_id() {
    let (app, _, _) = test_app();
    for uri in [
        "/api/swarms",
        "/api/dashboard/stats",
        "/api/security/alerts",
    ] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "User ID required");
    }
}

#[tokio::test]
async fn unknown_resources_are_404() {
    let (app, _, _) = test_app();
    let missing = uuid::Uuid::new_v4();

    let (status, _) = send(&app, "GET", &format!("/api/swarms/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", &format!("/api/templates/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/swarms/{missing}"),
        Some(json!({ "status": "error" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_payloads_are_400() {
    let (app, _, _) = test_app();

    let (status, _) = send(
        &app,
        "POST",
        "/api/swarms",
        Some(json!({ "name": "  ", "ownerId": "demo-user" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/swarms",
        Some(json!({ "name": "Alpha", "ownerId": "demo-user", "maxAgents": 5000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("maxAgents"));
}

#[tokio::test]
async fn agent_lifecycle_maintains_the_cached_counter() {
    let (app, _, _) = test_app();

    let (_, swarm) = send(&app, "POST", "/api/swarms", Some(alpha_payload())).await;
    let swarm_id = swarm["id"].as_str().unwrap().to_string();

    let (status, agent) = send(
        &app,
        "POST",
        "/api/agents",
        Some(json!({
            "name": "scanner",
            "type": "cybersecurity",
            "swarmId": swarm_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(agent["status"], "initializing");

    let (_, reread) = send(&app, "GET", &format!("/api/swarms/{swarm_id}"), None).await;
    assert_eq!(reread["agentCount"], 1);

    let (_, agents) = send(&app, "GET", &format!("/api/swarms/{swarm_id}/agents"), None).await;
    assert_eq!(agents.as_array().unwrap().len(), 1);

    let agent_id = agent["id"].as_str().unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/api/agents/{agent_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, reread) = send(&app, "GET", &format!("/api/swarms/{swarm_id}"), None).await;
    assert_eq!(reread["agentCount"], 0);
}

#[tokio::test]
async fn resolved_alerts_leave_the_unresolved_listing() {
    let (app, _, _) = test_app();

    let (_, swarm) = send(&app, "POST", "/api/swarms", Some(alpha_payload())).await;
    let swarm_id = swarm["id"].as_str().unwrap().to_string();

    let (status, alert) = send(
        &app,
        "POST",
        "/api/security/alerts",
        Some(json!({
            "title": "anomalous traffic",
            "severity": "high",
            "swarmId": swarm_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let alert_id = alert["id"].as_str().unwrap().to_string();

    let (_, listed) = send(&app, "GET", "/api/security/alerts?userId=demo-user", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/security/alerts/{alert_id}/resolve"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = send(&app, "GET", "/api/security/alerts?userId=demo-user", None).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn swarm_deletion_cascades_to_its_agents() {
    let (app, _, _) = test_app();

    let (_, swarm) = send(&app, "POST", "/api/swarms", Some(alpha_payload())).await;
    let swarm_id = swarm["id"].as_str().unwrap().to_string();
    send(
        &app,
        "POST",
        "/api/agents",
        Some(json!({ "name": "scanner", "type": "monitoring", "swarmId": swarm_id })),
    )
    .await;

    let (status, _) = send(&app, "DELETE", &format!("/api/swarms/{swarm_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, agents) = send(&app, "GET", &format!("/api/swarms/{swarm_id}/agents"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(agents.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn mutations_fan_out_one_envelope_per_subscriber() {
    let (app, ctx, _) = test_app();

    let mut subscribers = vec![
        ctx.events.subscribe(),
        ctx.events.subscribe(),
        ctx.events.subscribe(),
    ];
    let closed = ctx.events.subscribe();
    drop(closed);

    let (status, _) = send(&app, "POST", "/api/swarms", Some(alpha_payload())).await;
    assert_eq!(status, StatusCode::CREATED);

    for subscriber in &mut subscribers {
        let event = subscriber.recv().await.unwrap();
        assert_eq!(event.kind(), "swarm_created");
        assert!(subscriber.try_recv().is_err());
    }
}

#[tokio::test]
async fn updates_broadcast_the_updated_entity() {
    let (app, ctx, _) = test_app();
    let (_, swarm) = send(&app, "POST", "/api/swarms", Some(alpha_payload())).await;
    let swarm_id = swarm["id"].as_str().unwrap().to_string();

    let mut subscriber = ctx.events.subscribe();
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/swarms/{swarm_id}"),
        Some(json!({ "status": "error" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "error");

    let event = subscriber.recv().await.unwrap();
    assert_eq!(event.kind(), "swarm_updated");
}

#[tokio::test]
async fn heartbeat_reports_health_and_connection_count() {
    let (app, ctx, _) = test_app();
    let _subscriber = ctx.events.subscribe();

    let (status, body) = send(&app, "GET", "/api/monitoring/heartbeat", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["activeConnections"], 1);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn dashboard_stats_returns_all_four_numbers() {
    let (app, _, store) = test_app();
    store.initialize_defaults(Utc::now()).await.unwrap();
    send(&app, "POST", "/api/swarms", Some(alpha_payload())).await;

    let (status, stats) = send(&app, "GET", "/api/dashboard/stats?userId=demo-user", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["activeSwarms"], 1);
    assert_eq!(stats["totalAgents"], 0);
    assert!(stats["apiCalls"].is_i64() || stats["apiCalls"].is_u64());
    assert!(stats["securityAlerts"].is_i64() || stats["securityAlerts"].is_u64());
}

#[tokio::test]
async fn api_requests_land_in_the_audit_log() {
    let (app, _, store) = test_app();

    send(&app, "GET", "/api/templates", None).await;
    send(&app, "GET", "/api/monitoring/heartbeat", None).await;

    let count = store.count_since(24).await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn docs_endpoint_describes_the_api() {
    let (app, _, _) = test_app();
    let (status, body) = send(&app, "GET", "/api/docs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "SwarmWare API Documentation");
    assert_eq!(body["endpoints"]["swarms"], "/api/swarms");
}
