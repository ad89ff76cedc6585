// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Asynchronous notification channel (Pub/Sub).

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};

use super::gcp_auth::AccessTokenSource;

const PUBSUB_URL: &str = "https://pubsub.googleapis.com/v1";

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotifyError {
    #[error("topic unavailable: {0}")]
    Topic(String),

    #[error("publish failed: {0}")]
    Publish(String),
}

/// Fire-and-forget publish. Returns the message id.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, topic: &str, message: &Value) -> Result<String, NotifyError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// Pub/Sub REST publisher. `topic` is the full `projects/{p}/topics/{t}` name.
pub struct PubSubNotifier {
    http_client: reqwest::Client,
    tokens: Arc<AccessTokenSource>,
}

impl PubSubNotifier {
    pub fn new(tokens: Arc<AccessTokenSource>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            tokens,
        }
    }
}

#[async_trait]
impl Notifier for PubSubNotifier {
    async fn publish(&self, topic: &str, message: &Value) -> Result<String, NotifyError> {
        let token = self
            .tokens
            .token()
            .await
            .map_err(|e| NotifyError::Topic(e.to_string()))?;

        // Resolve the topic first so a misconfigured name fails loudly.
        let response = self
            .http_client
            .get(format!("{}/{}", PUBSUB_URL, topic))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| NotifyError::Topic(e.to_string()))?;
        if !response.status().is_success() {
            return Err(NotifyError::Topic(format!(
                "topic lookup returned status {}",
                response.status()
            )));
        }

        let data = serde_json::to_vec(message).map_err(|e| NotifyError::Publish(e.to_string()))?;
        let response = self
            .http_client
            .post(format!("{}/{}:publish", PUBSUB_URL, topic))
            .bearer_auth(&token)
            .json(&json!({ "messages": [ { "data": STANDARD.encode(data) } ] }))
            .send()
            .await
            .map_err(|e| NotifyError::Publish(e.to_string()))?;
        if !response.status().is_success() {
            return Err(NotifyError::Publish(format!(
                "publish returned status {}",
                response.status()
            )));
        }

        let published: PublishResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Publish(format!("invalid publish JSON: {e}")))?;

        let message_id = published.message_ids.into_iter().next().unwrap_or_default();
        tracing::info!(topic = %topic, message_id = %message_id, "Published message");
        Ok(message_id)
    }
}
