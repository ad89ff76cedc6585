// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task record routes.

use crate::db::Document;
use crate::error::{ApiResponse, Result};
use crate::middleware::auth::AuthUser;
use crate::models::TaskTypeList;
use crate::routes::JsonBody;
use crate::services::TaskListParams;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Extension, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/task/types", get(task_types))
        .route("/task", get(list_tasks).post(create_task))
        .route("/task/{task_id}", put(update_task).delete(delete_task))
}

async fn task_types() -> ApiResponse<TaskTypeList> {
    ApiResponse::with_body(TaskTypeList::default())
}

/// Create a task. The body carries the server-assigned id.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<Value>> {
    let task_id = state.tasks.create_task(&user.email, &body).await?;
    Ok(ApiResponse::with_body(json!({ "taskId": task_id })))
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<TaskListParams>,
) -> Result<ApiResponse<Vec<Document>>> {
    let tasks = state.tasks.list_tasks(&user.email, &params).await?;
    Ok(ApiResponse::with_body(tasks))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<Value>> {
    state.tasks.update_task(&user.email, &task_id, &body).await?;
    Ok(ApiResponse::ok())
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(task_id): Path<String>,
) -> Result<ApiResponse<Value>> {
    state.tasks.delete_task(&user.email, &task_id).await?;
    Ok(ApiResponse::ok())
}
