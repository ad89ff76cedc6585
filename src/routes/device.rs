// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device settings routes.

use crate::error::{ApiResponse, Result};
use crate::middleware::auth::AuthUser;
use crate::models::DeviceCapabilities;
use crate::routes::JsonBody;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Router};
use serde_json::Value;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/device", get(get_settings).put(put_settings))
        .route("/device/capabilities", get(capabilities))
}

async fn get_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse<Value>> {
    let item = state.settings.get_settings(&user.email).await?;
    Ok(ApiResponse::with_body(Value::Object(item)))
}

async fn put_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<Value>> {
    state.settings.put_settings(&user.email, &body).await?;
    Ok(ApiResponse::ok())
}

async fn capabilities() -> ApiResponse<DeviceCapabilities> {
    ApiResponse::with_body(DeviceCapabilities::default())
}
