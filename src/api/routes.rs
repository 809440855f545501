//! Route table and handlers for the REST surface.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api::{ApiState, ChannelSetting, ChannelSettingUpdate, ConfigView, ConfigViewUpdate};
use crate::core::alert::Alert;
use crate::store::{AlertStats, StoredAlert};

/// Build the full route table over shared state.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/alerts", get(list_alerts))
        .route("/api/alerts/:id/resolve", post(resolve_alert))
        .route("/api/alerts/:id", delete(delete_alert))
        .route("/api/stats", get(stats))
        .route("/api/config", get(get_config).put(update_config))
        .route("/api/notifications/channels", get(list_channels))
        .route("/api/notifications/channels/:id", put(update_channel))
        .route("/api/notifications/channels/:id/test", post(test_channel))
        .route("/api/system/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn list_alerts(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({
        "alerts": state.store.list(),
        "stats": state.store.stats(),
    }))
}

#[derive(Debug, Default, Deserialize)]
struct ResolveBody {
    note: Option<String>,
}

async fn resolve_alert(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    body: Option<Json<ResolveBody>>,
) -> Result<Json<StoredAlert>, StatusCode> {
    let note = body.and_then(|Json(body)| body.note);
    state
        .store
        .resolve(id, note)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_alert(State(state): State<ApiState>, Path(id): Path<Uuid>) -> Json<Value> {
    Json(json!({"success": state.store.delete(id)}))
}

async fn stats(State(state): State<ApiState>) -> Json<AlertStats> {
    Json(state.store.stats())
}

async fn get_config(State(state): State<ApiState>) -> Json<ConfigView> {
    Json(state.config_view.read().clone())
}

async fn update_config(
    State(state): State<ApiState>,
    Json(update): Json<ConfigViewUpdate>,
) -> Json<ConfigView> {
    let mut view = state.config_view.write();
    view.apply(update);
    Json(view.clone())
}

async fn list_channels(State(state): State<ApiState>) -> Json<Vec<ChannelSetting>> {
    Json(state.channel_settings.read().clone())
}

async fn update_channel(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(update): Json<ChannelSettingUpdate>,
) -> Result<Json<ChannelSetting>, StatusCode> {
    let mut settings = state.channel_settings.write();
    let setting = settings
        .iter_mut()
        .find(|setting| setting.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(enabled) = update.enabled {
        setting.enabled = enabled;
    }
    if let Some(config) = update.config {
        setting.config = config;
    }
    Ok(Json(setting.clone()))
}

async fn test_channel(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let setting = state
        .channel_settings
        .read()
        .iter()
        .find(|setting| setting.id == id)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)?;
    if !setting.enabled {
        return Ok(Json(json!({
            "success": false,
            "message": "Channel is disabled",
        })));
    }
    let Some(index) = state
        .channels
        .iter()
        .position(|channel| channel.id() == id)
    else {
        return Ok(Json(json!({
            "success": false,
            "message": "Channel is not active in this run",
        })));
    };

    let channels = state.channels.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let alert = Alert::info(
            "Test Notification",
            "This is a test notification from media-log-warden",
        );
        channels[index].deliver(&alert)
    })
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(match outcome {
        Ok(outcome) if outcome.success => json!({
            "success": true,
            "message": format!("Test notification sent successfully to {}", setting.name),
        }),
        Ok(outcome) => json!({"success": false, "message": outcome.detail}),
        Err(err) => json!({"success": false, "message": err.to_string()}),
    }))
}

async fn health(State(state): State<ApiState>) -> Json<Value> {
    let uptime_seconds = (chrono::Utc::now() - state.started_at).num_seconds();
    let metrics = state.metrics.clone();
    let host = tokio::task::spawn_blocking(move || metrics.lock().snapshot())
        .await
        .ok();
    Json(json!({
        "healthy": true,
        "uptimeSeconds": uptime_seconds,
        "version": env!("CARGO_PKG_VERSION"),
        "host": host,
    }))
}
