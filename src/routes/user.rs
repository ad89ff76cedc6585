// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User, embedded profile and profile-list routes.
//!
//! `PUT /user` and `PUT /user/profile` are distinct routes with distinct
//! validation; the handler never inspects the URL to decide which applies.

use crate::error::{ApiResponse, Result};
use crate::middleware::auth::AuthUser;
use crate::routes::JsonBody;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Extension, Router,
};
use serde_json::Value;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/user",
            get(get_user).post(post_user).put(put_user).delete(delete_user),
        )
        .route(
            "/user/profile",
            get(get_profile).put(put_profile).delete(clear_profile),
        )
        .route("/user/profiles", get(count_profiles).put(put_list_profile))
        .route("/user/profiles/{profile_id}", delete(delete_profile))
}

// ─── User ────────────────────────────────────────────────────

/// Create the caller's user document. Accepted once the account-created
/// notification is published.
async fn post_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<Value>> {
    state.users.post_user(&user.email, &body).await?;
    Ok(ApiResponse::accepted())
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse<Value>> {
    let item = state.users.get_user(&user.email).await?;
    Ok(ApiResponse::with_body(Value::Object(item)))
}

async fn put_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<Value>> {
    state.users.put_user(&user.email, &body).await?;
    Ok(ApiResponse::ok())
}

/// Queue deletion of the caller's account and all their data.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse<Value>> {
    tracing::info!(email = %user.email, "User-initiated account deletion");
    state.deletion.request(&user.email, &user.user_name).await?;
    Ok(ApiResponse::accepted())
}

// ─── Embedded profile ────────────────────────────────────────

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse<Value>> {
    let profile = state.profiles.get_embedded_profile(&user.email).await?;
    Ok(ApiResponse::with_body(profile))
}

async fn put_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<Value>> {
    state.users.put_profile(&user.email, &body).await?;
    Ok(ApiResponse::ok())
}

async fn clear_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse<Value>> {
    state.profiles.clear_embedded_profile(&user.email).await?;
    Ok(ApiResponse::ok())
}

// ─── Profile list ────────────────────────────────────────────

async fn count_profiles(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response> {
    Ok(match state.profiles.count_profiles(&user.email).await? {
        Some(count) => ApiResponse::with_body(count).into_response(),
        None => ApiResponse::ok().message("User Not Found").into_response(),
    })
}

async fn put_list_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody,
) -> Result<ApiResponse<Value>> {
    state.users.put_list_profile(&user.email, &body).await?;
    Ok(ApiResponse::ok())
}

async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(profile_id): Path<String>,
) -> Result<ApiResponse<Value>> {
    state
        .profiles
        .delete_profile(&user.email, &profile_id)
        .await?;
    Ok(ApiResponse::ok())
}
