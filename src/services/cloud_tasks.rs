// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hand-off of account deletion to a Cloud Tasks queue.
//!
//! `DELETE /user` only acknowledges the request; the queue later calls back
//! `POST /tasks/delete-account`, where the deletion orchestrator runs.
//!
//! Uses the official google-cloud-tasks-v2 SDK.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Callback path the queued task targets.
pub const DELETE_ACCOUNT_ENDPOINT: &str = "/tasks/delete-account";

/// Payload for the account deletion task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountPayload {
    pub email: String,
    pub user_name: String,
}

/// Delegate that runs account deletion out of band.
///
/// Success only means the hand-off was accepted, not that deletion finished.
#[async_trait]
pub trait DeletionDelegate: Send + Sync {
    async fn hand_off(&self, payload: &DeleteAccountPayload) -> anyhow::Result<()>;
}

/// Cloud Tasks client wrapper.
pub struct CloudTasksDelegate {
    project_id: String,
    location: String,
    queue_name: String,
    service_url: String,
}

impl CloudTasksDelegate {
    pub fn new(project_id: &str, region: &str, service_url: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            location: region.to_string(),
            queue_name: crate::config::DELETION_QUEUE_NAME.to_string(),
            service_url: service_url.trim_end_matches('/').to_string(),
        }
    }

    fn queue_path(&self) -> String {
        format!(
            "projects/{}/locations/{}/queues/{}",
            self.project_id, self.location, self.queue_name
        )
    }
}

#[async_trait]
impl DeletionDelegate for CloudTasksDelegate {
    async fn hand_off(&self, payload: &DeleteAccountPayload) -> anyhow::Result<()> {
        use google_cloud_tasks_v2::client::CloudTasks;
        use google_cloud_tasks_v2::model::{HttpRequest, OidcToken, Task};

        let client = CloudTasks::builder()
            .build()
            .await
            .map_err(|e| anyhow::anyhow!("Cloud Tasks client error: {}", e))?;

        let body = serde_json::to_vec(payload)?;

        let http_request = HttpRequest::default()
            .set_url(format!("{}{}", self.service_url, DELETE_ACCOUNT_ENDPOINT))
            .set_http_method("POST")
            .set_body(axum::body::Bytes::from(body))
            .set_headers(std::collections::HashMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]))
            .set_oidc_token(
                OidcToken::default()
                    .set_service_account_email(format!(
                        "sleeplog-api@{}.iam.gserviceaccount.com",
                        self.project_id
                    ))
                    .set_audience(self.service_url.clone()),
            );

        let task = Task::default().set_http_request(http_request);

        client
            .create_task()
            .set_parent(self.queue_path())
            .set_task(task)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Cloud Tasks create error: {}", e))?;

        tracing::info!(email = %payload.email, "Queued account deletion task");
        Ok(())
    }
}
