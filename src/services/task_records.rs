// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task records keyed by (email, taskId).
//!
//! The task id is derived on the server from the owner's local part, the UTC
//! date of `startTime` and the creation second. Later updates must keep
//! `startTime` inside that date's `[midnight, midnight + 1 day)` window.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::db::{
    keys, Document, DocumentStore, FieldPath, Filter, ItemKey, Query, SortCondition, TableSchema,
    UpdateExpression,
};
use crate::error::{AppError, Result};
use crate::models::task::{TASK_PROJECTION, TASK_TYPES};
use crate::models::{TaskFields, TaskId};
use crate::services::validation::{self, WhitelistMode};
use crate::time_utils;

/// Path value meaning "every task of the caller".
pub const ALL_TASKS: &str = "*";

/// Query parameters of `GET /task`. Kept as strings so that malformed values
/// surface as a client error rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListParams {
    pub all: Option<String>,
    pub task_id: Option<String>,
    pub task_type: Option<String>,
    pub since: Option<String>,
}

pub struct TaskService {
    store: Arc<dyn DocumentStore>,
    records: TableSchema,
}

impl TaskService {
    pub fn new(store: Arc<dyn DocumentStore>, records: TableSchema) -> Self {
        Self { store, records }
    }

    /// Write a new record and return its derived id.
    ///
    /// No existence check: two creations in the same second for the same
    /// start date overwrite each other.
    pub async fn create_task(&self, email: &str, body: &Value) -> Result<String> {
        let fields = task_fields(body)?;
        let start_time = fields.start_time.ok_or_else(|| {
            tracing::debug!(email = %email, "Task without startTime");
            AppError::bad_request()
        })?;

        let task_id = TaskId::derive(email, start_time, time_utils::now_unix())
            .ok_or_else(AppError::bad_request)?
            .to_string();

        let mut item = to_document(&fields)?;
        item.insert(keys::EMAIL.to_string(), Value::from(email));
        item.insert(keys::TASK_ID.to_string(), Value::from(task_id.as_str()));
        self.store.put(&self.records, item).await?;

        tracing::info!(email = %email, task_id = %task_id, "Task created");
        Ok(task_id)
    }

    pub async fn update_task(&self, email: &str, task_id: &str, body: &Value) -> Result<()> {
        let parsed = TaskId::parse(task_id).ok_or_else(|| {
            tracing::debug!(task_id = %task_id, "Malformed task id");
            AppError::bad_request()
        })?;
        let fields = task_fields(body)?;
        if fields == TaskFields::default() {
            return Err(AppError::bad_request());
        }

        if let Some(start_time) = fields.start_time {
            let (day_start, day_end) = parsed.day_window();
            if !(day_start..day_end).contains(&start_time) {
                tracing::debug!(task_id = %task_id, start_time, "startTime outside task day");
                return Err(AppError::bad_request());
            }
        }

        let key = ItemKey::composite(email, task_id);
        let update = to_document(&fields)?
            .into_iter()
            .fold(UpdateExpression::new(), |update, (name, value)| {
                update.set(FieldPath::field(name), value)
            });

        match self.store.update(&self.records, &key, &update).await? {
            Some(_) => {
                tracing::info!(email = %email, task_id = %task_id, "Task updated");
                Ok(())
            }
            None => {
                tracing::warn!(email = %email, task_id = %task_id, "Update of missing task");
                Err(AppError::bad_request())
            }
        }
    }

    /// Every task (`all=true`), or those matching all supplied conditions.
    pub async fn list_tasks(&self, email: &str, params: &TaskListParams) -> Result<Vec<Document>> {
        let all = match params.all.as_deref() {
            None | Some("false") => false,
            Some("true") => true,
            Some(other) => {
                tracing::debug!(all = %other, "Non-boolean 'all'");
                return Err(AppError::bad_request());
            }
        };

        let mut query = Query::partition(email).project(&TASK_PROJECTION);
        if !all {
            // An empty taskId counts as absent.
            let task_id = params.task_id.as_deref().filter(|id| !id.is_empty());
            if task_id.is_none() && params.task_type.is_none() && params.since.is_none() {
                return Err(AppError::bad_request());
            }
            if let Some(task_id) = task_id {
                query = query.sort_condition(SortCondition::Eq(task_id.into()));
            }
            if let Some(task_type) = &params.task_type {
                let task_type = parse_int(task_type)?;
                if !TASK_TYPES.contains(&task_type) {
                    tracing::debug!(task_type, "Unknown taskType filter");
                    return Err(AppError::bad_request());
                }
                query = query.filter(Filter::eq("taskType", task_type));
            }
            if let Some(since) = &params.since {
                query = query.filter(Filter::ge("startTime", parse_int(since)?));
            }
        }

        Ok(self.store.query(&self.records, &query).await?)
    }

    /// Delete one task or, with `"*"`, every task of the caller.
    pub async fn delete_task(&self, email: &str, task_id: &str) -> Result<usize> {
        let deleted = if task_id == ALL_TASKS {
            let items = self
                .store
                .query(&self.records, &Query::partition(email).project(&[keys::TASK_ID]))
                .await?;
            let mut deleted = 0;
            for item in items {
                let Some(id) = item.get(keys::TASK_ID).and_then(Value::as_str) else {
                    continue;
                };
                if self
                    .store
                    .delete(&self.records, &ItemKey::composite(email, id))
                    .await?
                    .is_some()
                {
                    deleted += 1;
                }
            }
            deleted
        } else {
            self.store
                .delete(&self.records, &ItemKey::composite(email, task_id))
                .await?
                .map_or(0, |_| 1)
        };

        if deleted == 0 {
            return Err(AppError::BadRequest("No data exists to delete".to_string()));
        }
        tracing::info!(email = %email, task_id = %task_id, deleted, "Tasks deleted");
        Ok(deleted)
    }
}

/// Whitelist and range-check a task body.
fn task_fields(body: &Value) -> Result<TaskFields> {
    validation::check_whitelist(body, WhitelistMode::Task)?;
    let fields: TaskFields = serde_json::from_value(body.clone()).map_err(|e| {
        tracing::debug!(error = %e, "Task body does not decode");
        AppError::bad_request()
    })?;

    if let Some(task_type) = fields.task_type {
        if !TASK_TYPES.contains(&task_type) {
            return Err(AppError::BadRequest(format!(
                "Invalid Input: taskType -> {}",
                task_type
            )));
        }
    }
    if let Some(elapsed) = fields.elapsed_time {
        if elapsed < 0 {
            return Err(AppError::BadRequest(format!(
                "Invalid Input: elapsedTime -> {}",
                elapsed
            )));
        }
    }
    Ok(fields)
}

fn to_document(fields: &TaskFields) -> Result<Map<String, Value>> {
    match serde_json::to_value(fields) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Internal(anyhow::anyhow!("task fields are not a map"))),
        Err(e) => Err(AppError::Internal(e.into())),
    }
}

fn parse_int(raw: &str) -> Result<i64> {
    raw.parse().map_err(|_| AppError::bad_request())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use serde_json::json;

    // 2024-01-01T12:00:00Z
    const NOON: i64 = 1_704_110_400;

    fn service() -> TaskService {
        TaskService::new(
            Arc::new(MemoryStore::new()),
            TableSchema::composite("records", "email", "taskId"),
        )
    }

    #[tokio::test]
    async fn created_id_carries_owner_and_start_date() {
        let service = service();
        let id = service
            .create_task("sam@example.com", &json!({ "taskType": 2, "startTime": NOON, "elapsedTime": 600 }))
            .await
            .unwrap();
        assert!(id.starts_with("sam-20240101-"));

        let tasks = service
            .list_tasks(
                "sam@example.com",
                &TaskListParams {
                    task_id: Some(id.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0]["taskId"], json!(id));
        assert!(tasks[0].get("email").is_none());
    }

    #[tokio::test]
    async fn start_time_window_is_half_open() {
        let service = service();
        let id = service
            .create_task("sam@example.com", &json!({ "startTime": NOON }))
            .await
            .unwrap();

        let midnight = 1_704_067_200;
        service
            .update_task("sam@example.com", &id, &json!({ "startTime": midnight }))
            .await
            .unwrap();

        let err = service
            .update_task("sam@example.com", &id, &json!({ "startTime": midnight + 86_400 }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn filters_combine_and_validate() {
        let service = service();
        service
            .create_task("sam@example.com", &json!({ "taskType": 1, "startTime": NOON }))
            .await
            .unwrap();

        let by_type = |task_type: &str| TaskListParams {
            task_type: Some(task_type.to_string()),
            since: Some((NOON + 1).to_string()),
            ..Default::default()
        };
        assert!(service.list_tasks("sam@example.com", &by_type("1")).await.unwrap().is_empty());

        let bad_all = TaskListParams {
            all: Some("yes".to_string()),
            ..Default::default()
        };
        assert!(service.list_tasks("sam@example.com", &bad_all).await.is_err());
        assert!(service
            .list_tasks("sam@example.com", &TaskListParams::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn delete_missing_task_reports_no_data() {
        let err = service()
            .delete_task("sam@example.com", ALL_TASKS)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "No data exists to delete"));
    }
}
