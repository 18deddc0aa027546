// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route table and handlers for the polling-client contract.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use wh_core::{BusFilter, BusMessage};
use wh_registry::{Component, ComponentGroup};

use crate::http::error::ApiError;
use crate::lifecycle::HubState;
use crate::notifications::Notification;

const DEFAULT_WAIT_SECS: u64 = 5;
const MAX_WAIT_SECS: u64 = 60;

pub fn router(state: Arc<HubState>) -> Router {
    Router::new()
        .route("/api/v1/areas", get(list_areas))
        .route("/api/v1/components", get(list_components))
        .route("/api/v1/components/:uid", get(get_component))
        .route("/api/v1/global_variables", get(global_variables))
        .route("/api/v1/notifications", get(list_notifications))
        .route("/api/v1/notifications/:uid", delete(delete_notification))
        .route("/api/v1/message_bus/wait_for", post(wait_for))
        .route("/api/v1/system/status", get(system_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Areas are the hub's component groups.
async fn list_areas(State(state): State<Arc<HubState>>) -> Json<Vec<ComponentGroup>> {
    Json(state.groups.groups())
}

async fn list_components(State(state): State<Arc<HubState>>) -> Json<Vec<Component>> {
    Json(state.components.components())
}

async fn get_component(
    State(state): State<Arc<HubState>>,
    Path(uid): Path<String>,
) -> Result<Json<Component>, ApiError> {
    Ok(Json(state.components.get(&uid)?))
}

async fn global_variables(State(state): State<Arc<HubState>>) -> Json<Map<String, Value>> {
    Json(state.global_variables.values())
}

async fn list_notifications(State(state): State<Arc<HubState>>) -> Json<Vec<Notification>> {
    Json(state.notifications.notifications())
}

/// Idempotent delete: unknown uids still answer 204.
async fn delete_notification(
    State(state): State<Arc<HubState>>,
    Path(uid): Path<String>,
) -> StatusCode {
    state.notifications.delete(&uid);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
struct WaitQuery {
    /// Seconds to wait; defaults to 5, capped at 60
    timeout: Option<u64>,
    /// Last-seen bus timestamp for history replay
    since: Option<u64>,
}

/// Long-poll the bus: body is a JSON array of filter objects; the response
/// is the matched messages, or an empty array once the timeout elapses.
async fn wait_for(
    State(state): State<Arc<HubState>>,
    Query(query): Query<WaitQuery>,
    Json(filters): Json<Vec<BusFilter>>,
) -> Result<Json<Vec<BusMessage>>, ApiError> {
    if state.shutdown.is_cancelled() {
        return Err(ApiError::Shutdown);
    }
    let timeout = Duration::from_secs(query.timeout.unwrap_or(DEFAULT_WAIT_SECS).min(MAX_WAIT_SECS));
    Ok(Json(state.bus.wait_for(filters, timeout, query.since).await))
}

async fn system_status(State(state): State<Arc<HubState>>) -> Json<Map<String, Value>> {
    Json(state.system_status.snapshot())
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
