// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain error → HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use wh_registry::RegistryError;

/// Errors surfaced by facade handlers.
///
/// NotFound → 404, InvalidArgument → 400, StorageFailure → 500,
/// Shutdown → 503. Bodies carry an `error` message.
#[derive(Debug)]
pub enum ApiError {
    Registry(RegistryError),
    Shutdown,
}

impl From<RegistryError> for ApiError {
    fn from(error: RegistryError) -> Self {
        ApiError::Registry(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Registry(e) => {
                let status = if e.is_not_found() {
                    StatusCode::NOT_FOUND
                } else if matches!(e, RegistryError::InvalidUid(_)) {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, e.to_string())
            }
            ApiError::Shutdown => (StatusCode::SERVICE_UNAVAILABLE, "shutting down".to_string()),
        };
        (status, Json(json!({"error": message}))).into_response()
    }
}
