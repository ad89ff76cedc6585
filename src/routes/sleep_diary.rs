// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sleep-diary routes.

use crate::db::Document;
use crate::error::{ApiResponse, Result};
use crate::middleware::auth::AuthUser;
use crate::routes::JsonBody;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Extension, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sleep-diary", get(list_entries).post(create_entry))
        .route(
            "/sleep-diary/{diary_date}",
            put(update_entry).delete(delete_entries),
        )
}

#[derive(Deserialize)]
struct ListQuery {
    /// Unix seconds; entries from that UTC day onwards are returned.
    since: Option<String>,
}

async fn create_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<Value>> {
    state.diary.create_or_replace_entry(&user.email, &body).await?;
    Ok(ApiResponse::ok())
}

async fn list_entries(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListQuery>,
) -> Result<ApiResponse<Vec<Document>>> {
    let entries = state
        .diary
        .list_entries(&user.email, params.since.as_deref())
        .await?;
    Ok(ApiResponse::with_body(entries))
}

async fn update_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(diary_date): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<Value>> {
    state
        .diary
        .update_entry(&user.email, &diary_date, &body)
        .await?;
    Ok(ApiResponse::ok())
}

async fn delete_entries(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(diary_date): Path<String>,
) -> Result<ApiResponse<Value>> {
    state.diary.delete_entries(&user.email, &diary_date).await?;
    Ok(ApiResponse::ok())
}
