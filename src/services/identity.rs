// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider holding end-user accounts.
//!
//! Production uses the Identity Platform admin REST API; the pool is an
//! Identity Platform tenant and the user name is the account's local id.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::gcp_auth::AccessTokenSource;

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    #[error("account not found: {0}")]
    NotFound(String),

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Account administration used by account deletion.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Succeeds when the account exists.
    async fn admin_get_user(&self, pool: &str, user_name: &str) -> Result<(), IdentityError>;

    /// Remove the account.
    async fn admin_delete_user(&self, pool: &str, user_name: &str) -> Result<(), IdentityError>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<serde_json::Value>,
}

/// Identity Platform admin client.
pub struct IdentityPlatformClient {
    http_client: reqwest::Client,
    project_id: String,
    tokens: Arc<AccessTokenSource>,
}

impl IdentityPlatformClient {
    pub fn new(project_id: &str, tokens: Arc<AccessTokenSource>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            project_id: project_id.to_string(),
            tokens,
        }
    }

    async fn post(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, IdentityError> {
        let token = self
            .tokens
            .token()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let url = format!(
            "{}/projects/{}/accounts:{}",
            IDENTITY_TOOLKIT_URL, self.project_id, method
        );

        self.http_client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for IdentityPlatformClient {
    async fn admin_get_user(&self, pool: &str, user_name: &str) -> Result<(), IdentityError> {
        let response = self
            .post("lookup", json!({ "tenantId": pool, "localId": [user_name] }))
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::Unavailable(format!(
                "accounts:lookup returned status {}",
                response.status()
            )));
        }

        let lookup: LookupResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("invalid lookup JSON: {e}")))?;

        if lookup.users.is_empty() {
            return Err(IdentityError::NotFound(user_name.to_string()));
        }
        Ok(())
    }

    async fn admin_delete_user(&self, pool: &str, user_name: &str) -> Result<(), IdentityError> {
        let response = self
            .post("delete", json!({ "tenantId": pool, "localId": user_name }))
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            reqwest::StatusCode::NOT_FOUND => Err(IdentityError::NotFound(user_name.to_string())),
            status => Err(IdentityError::Unavailable(format!(
                "accounts:delete returned status {}",
                status
            ))),
        }
    }
}
