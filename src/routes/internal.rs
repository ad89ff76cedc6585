// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Callbacks delivered by Cloud Tasks.

use crate::error::ApiResponse;
use crate::middleware::tasks_auth::require_tasks_auth;
use crate::services::cloud_tasks::{DeleteAccountPayload, DELETE_ACCOUNT_ENDPOINT};
use crate::services::DeletionReport;
use crate::AppState;
use axum::{extract::State, middleware, routing::post, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(DELETE_ACCOUNT_ENDPOINT, post(delete_account))
        .route_layer(middleware::from_fn(require_tasks_auth))
}

/// Run account deletion. Always 200 so the queue does not retry; per-table
/// failures are in the report.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DeleteAccountPayload>,
) -> ApiResponse<DeletionReport> {
    tracing::info!(email = %payload.email, "Processing account deletion from Cloud Task");
    let report = state.deletion.delete_account(&payload).await;
    ApiResponse::with_body(report)
}
