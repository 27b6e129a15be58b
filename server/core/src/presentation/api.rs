use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::application::dashboard::DashboardService;
use crate::domain::agent::{AgentId, AgentUpdate, NewAgent};
use crate::domain::app_state::keys;
use crate::domain::events::SwarmEvent;
use crate::domain::repository::{
    AgentRepository, ApiCallRepository, AppStateStore, RepositoryError, SecurityAlertRepository,
    SwarmRepository, TemplateRepository, UserRepository,
};
use crate::domain::security::{AlertId, NewSecurityAlert};
use crate::domain::swarm::{NewSwarm, SwarmId, SwarmUpdate};
use crate::domain::template::{NewTemplate, TemplateId};
use crate::domain::user::UpsertUser;
use crate::domain::validation::ValidationError;
use crate::infrastructure::event_bus::EventBus;
use crate::presentation::auth::CurrentUser;
use crate::presentation::{audit, ws};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppContext {
    pub users: Arc<dyn UserRepository>,
    pub swarms: Arc<dyn SwarmRepository>,
    pub agents: Arc<dyn AgentRepository>,
    pub templates: Arc<dyn TemplateRepository>,
    pub alerts: Arc<dyn SecurityAlertRepository>,
    pub api_calls: Arc<dyn ApiCallRepository>,
    pub app_state: Arc<dyn AppStateStore>,
    pub dashboard: Arc<DashboardService>,
    pub events: EventBus,
}

/// Handler-boundary error. Everything a handler can fail with is converted
/// here and rendered as an HTTP status plus `{"message": ..}` body; nothing
/// escapes as a process-level panic.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Build the full HTTP surface: REST under `/api` plus the `/ws` realtime
/// channel. The audit middleware records every `/api` request.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/api/dashboard/stats", get(dashboard_stats))
        .route("/api/swarms", get(list_swarms).post(create_swarm))
        .route(
            "/api/swarms/{id}",
            get(get_swarm).put(update_swarm).delete(delete_swarm),
        )
        .route("/api/swarms/{id}/agents", get(list_agents))
        .route("/api/agents", post(create_agent))
        .route("/api/agents/{id}", put(update_agent).delete(delete_agent))
        .route("/api/templates", get(list_templates).post(create_template))
        .route("/api/templates/{id}", get(get_template))
        .route(
            "/api/security/alerts",
            get(list_security_alerts).post(create_security_alert),
        )
        .route("/api/security/alerts/{id}/resolve", put(resolve_security_alert))
        .route("/api/monitoring/heartbeat", get(heartbeat))
        .route("/api/docs", get(api_docs))
        .route("/ws", get(ws::ws_handler))
        .layer(middleware::from_fn_with_state(
            ctx.clone(),
            audit::record_api_call,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

// ── Dashboard ────────────────────────────────────────────────────────────

async fn dashboard_stats(
    State(ctx): State<AppContext>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = ctx.dashboard.stats(&user_id).await?;
    Ok(Json(stats))
}

// ── Swarms ───────────────────────────────────────────────────────────────

async fn list_swarms(
    State(ctx): State<AppContext>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let swarms = ctx.swarms.list_for_owner(&user_id).await?;
    Ok(Json(swarms))
}

async fn get_swarm(
    State(ctx): State<AppContext>,
    Path(id): Path<SwarmId>,
) -> Result<impl IntoResponse, ApiError> {
    let swarm = ctx
        .swarms
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("swarm"))?;
    Ok(Json(swarm))
}

async fn create_swarm(
    State(ctx): State<AppContext>,
    Json(payload): Json<NewSwarm>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;

    // the owner row is created on first sight; identity is resolved upstream
    if ctx.users.find_by_id(&payload.owner_id).await?.is_none() {
        ctx.users
            .upsert(UpsertUser::bare(payload.owner_id.clone()))
            .await?;
    }

    let swarm = ctx.swarms.create(payload).await?;

    if let Err(err) = ctx.app_state.increment_counter(keys::DEPLOYMENT_COUNT, 1).await {
        warn!(error = %err, "failed to bump deployment counter");
    }

    ctx.events.publish(SwarmEvent::SwarmCreated(swarm.clone()));
    Ok((StatusCode::CREATED, Json(swarm)))
}

async fn update_swarm(
    State(ctx): State<AppContext>,
    Path(id): Path<SwarmId>,
    Json(payload): Json<SwarmUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;
    let swarm = ctx.swarms.update(id, payload).await?;
    ctx.events.publish(SwarmEvent::SwarmUpdated(swarm.clone()));
    Ok(Json(swarm))
}

async fn delete_swarm(
    State(ctx): State<AppContext>,
    Path(id): Path<SwarmId>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.swarms.delete(id).await?;
    ctx.events.publish(SwarmEvent::SwarmDeleted { id });
    Ok(StatusCode::NO_CONTENT)
}

// ── Agents ───────────────────────────────────────────────────────────────

async fn list_agents(
    State(ctx): State<AppContext>,
    Path(swarm_id): Path<SwarmId>,
) -> Result<impl IntoResponse, ApiError> {
    let agents = ctx.agents.list_for_swarm(swarm_id).await?;
    Ok(Json(agents))
}

async fn create_agent(
    State(ctx): State<AppContext>,
    Json(payload): Json<NewAgent>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;
    let agent = ctx.agents.create(payload).await?;
    ctx.events.publish(SwarmEvent::AgentCreated(agent.clone()));
    Ok((StatusCode::CREATED, Json(agent)))
}

async fn update_agent(
    State(ctx): State<AppContext>,
    Path(id): Path<AgentId>,
    Json(payload): Json<AgentUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let agent = ctx.agents.update(id, payload).await?;
    ctx.events.publish(SwarmEvent::AgentUpdated(agent.clone()));
    Ok(Json(agent))
}

async fn delete_agent(
    State(ctx): State<AppContext>,
    Path(id): Path<AgentId>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.agents.delete(id).await?;
    ctx.events.publish(SwarmEvent::AgentDeleted { id });
    Ok(StatusCode::NO_CONTENT)
}

// ── Templates ────────────────────────────────────────────────────────────

async fn list_templates(State(ctx): State<AppContext>) -> Result<impl IntoResponse, ApiError> {
    let templates = ctx.templates.list_public().await?;
    Ok(Json(templates))
}

async fn get_template(
    State(ctx): State<AppContext>,
    Path(id): Path<TemplateId>,
) -> Result<impl IntoResponse, ApiError> {
    let template = ctx
        .templates
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("template"))?;
    Ok(Json(template))
}

async fn create_template(
    State(ctx): State<AppContext>,
    Json(payload): Json<NewTemplate>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;
    let template = ctx.templates.create(payload).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

// ── Security ─────────────────────────────────────────────────────────────

async fn list_security_alerts(
    State(ctx): State<AppContext>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let alerts = ctx.alerts.list_unresolved_for_owner(&user_id).await?;
    Ok(Json(alerts))
}

async fn create_security_alert(
    State(ctx): State<AppContext>,
    Json(payload): Json<NewSecurityAlert>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;
    let alert = ctx.alerts.create(payload).await?;
    ctx.events.publish(SwarmEvent::SecurityAlert(alert.clone()));
    Ok((StatusCode::CREATED, Json(alert)))
}

async fn resolve_security_alert(
    State(ctx): State<AppContext>,
    Path(id): Path<AlertId>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.alerts.resolve(id).await?;
    ctx.events.publish(SwarmEvent::AlertResolved { id });
    Ok(StatusCode::NO_CONTENT)
}

// ── Monitoring ───────────────────────────────────────────────────────────

async fn heartbeat(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(json!({
        "timestamp": Utc::now().to_rfc3339(),
        "status": "healthy",
        "activeConnections": ctx.events.subscriber_count(),
    }))
}

async fn api_docs() -> impl IntoResponse {
    Json(json!({
        "title": "SwarmWare API Documentation",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "API for AI agent swarm management",
        "endpoints": {
            "dashboard": "/api/dashboard/stats",
            "swarms": "/api/swarms",
            "agents": "/api/agents",
            "templates": "/api/templates",
            "security": "/api/security/alerts",
            "monitoring": "/api/monitoring/heartbeat",
            "realtime": "/ws",
        }
    }))
}
