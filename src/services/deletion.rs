// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account deletion.
//!
//! `DELETE /user` only checks that the identity-provider account exists and
//! hands the work to the deletion queue. The queued callback then removes the
//! user's data from every table and finally the identity account.
//!
//! Deletion is best-effort: each table is attempted independently and a
//! failure is logged and reported, never propagated. Nothing is rolled back.
//! Re-running is safe because deleting an absent item is a no-op.

use std::sync::Arc;

use serde::Serialize;

use crate::db::{DocumentStore, ItemKey, Query, StoreError, TableSchema, Tables};
use crate::error::{AppError, Result};
use crate::services::cloud_tasks::{DeleteAccountPayload, DeletionDelegate};
use crate::services::identity::IdentityProvider;
use crate::services::profiles::user_not_found;

/// Outcome of deleting one table's items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDeletion {
    pub table: String,
    pub deleted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response body of the deletion callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReport {
    pub tables: Vec<TableDeletion>,
    pub identity_deleted: bool,
}

pub struct DeletionService {
    store: Arc<dyn DocumentStore>,
    tables: Tables,
    identity: Arc<dyn IdentityProvider>,
    delegate: Arc<dyn DeletionDelegate>,
    identity_pool_id: String,
}

impl DeletionService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        tables: Tables,
        identity: Arc<dyn IdentityProvider>,
        delegate: Arc<dyn DeletionDelegate>,
        identity_pool_id: String,
    ) -> Self {
        Self {
            store,
            tables,
            identity,
            delegate,
            identity_pool_id,
        }
    }

    /// Confirm the account exists and queue its deletion.
    pub async fn request(&self, email: &str, user_name: &str) -> Result<()> {
        if let Err(e) = self
            .identity
            .admin_get_user(&self.identity_pool_id, user_name)
            .await
        {
            tracing::warn!(email = %email, user_name = %user_name, error = %e, "Identity account lookup failed");
            return Err(user_not_found());
        }

        let payload = DeleteAccountPayload {
            email: email.to_string(),
            user_name: user_name.to_string(),
        };
        self.delegate.hand_off(&payload).await.map_err(|e| {
            tracing::error!(email = %email, error = %e, "Deletion hand-off failed");
            AppError::Internal(e)
        })?;

        tracing::info!(email = %email, "Account deletion requested");
        Ok(())
    }

    /// Delete the account's data from every table, then the identity account.
    pub async fn delete_account(&self, payload: &DeleteAccountPayload) -> DeletionReport {
        let email = payload.email.as_str();
        tracing::info!(email = %email, "Deleting account data");

        let mut tables = Vec::with_capacity(4);
        for table in [
            &self.tables.users,
            &self.tables.sleep_diary,
            &self.tables.settings,
            &self.tables.records,
        ] {
            let outcome = match self.delete_table(table, email).await {
                Ok(deleted) => {
                    tracing::info!(email = %email, table = %table.name, deleted, "Table cleared");
                    TableDeletion {
                        table: table.name.clone(),
                        deleted,
                        error: None,
                    }
                }
                Err((deleted, e)) => {
                    tracing::error!(email = %email, table = %table.name, deleted, error = %e, "Table deletion failed, continuing");
                    TableDeletion {
                        table: table.name.clone(),
                        deleted,
                        error: Some(e.to_string()),
                    }
                }
            };
            tables.push(outcome);
        }

        let identity_deleted = match self
            .identity
            .admin_delete_user(&self.identity_pool_id, &payload.user_name)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(email = %email, user_name = %payload.user_name, error = %e, "Identity account deletion failed");
                false
            }
        };

        tracing::info!(email = %email, identity_deleted, "Account deletion finished");
        DeletionReport {
            tables,
            identity_deleted,
        }
    }

    /// Delete every item owned by `email`. On failure, also reports how many
    /// items were removed before it.
    async fn delete_table(
        &self,
        table: &TableSchema,
        email: &str,
    ) -> std::result::Result<usize, (usize, StoreError)> {
        let Some(sort_key) = table.sort_key else {
            return self
                .store
                .delete(table, &ItemKey::partition(email))
                .await
                .map(|removed| usize::from(removed.is_some()))
                .map_err(|e| (0, e));
        };

        let items = self
            .store
            .query(table, &Query::partition(email).project(&[sort_key]))
            .await
            .map_err(|e| (0, e))?;

        let keys: Vec<ItemKey> = items
            .iter()
            .filter_map(|item| item.get(sort_key).and_then(crate::db::SortKey::from_value))
            .map(|sort| ItemKey::composite(email, sort))
            .collect();

        // Keep going past a failed item; the first error is reported.
        let mut deleted = 0;
        let mut first_error = None;
        for key in keys {
            match self.store.delete(table, &key).await {
                Ok(Some(_)) => deleted += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(email = %email, table = %table.name, error = %e, "Item delete failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err((deleted, e)),
            None => Ok(deleted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::MemoryStore;
    use crate::services::identity::IdentityError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeIdentity {
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        async fn admin_get_user(&self, _pool: &str, user_name: &str) -> std::result::Result<(), IdentityError> {
            if user_name == "ghost" {
                return Err(IdentityError::NotFound(user_name.to_string()));
            }
            Ok(())
        }

        async fn admin_delete_user(&self, _pool: &str, user_name: &str) -> std::result::Result<(), IdentityError> {
            self.deleted.lock().unwrap().push(user_name.to_string());
            Ok(())
        }
    }

    struct NoDelegate;

    #[async_trait]
    impl DeletionDelegate for NoDelegate {
        async fn hand_off(&self, _payload: &DeleteAccountPayload) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn service(store: MemoryStore, identity: Arc<FakeIdentity>) -> DeletionService {
        let tables = Tables::from_config(&Config::test_default());
        DeletionService::new(
            Arc::new(store),
            tables,
            identity,
            Arc::new(NoDelegate),
            "pool".to_string(),
        )
    }

    fn payload() -> DeleteAccountPayload {
        DeleteAccountPayload {
            email: "owl@example.com".to_string(),
            user_name: "owl".to_string(),
        }
    }

    #[tokio::test]
    async fn user_without_records_is_deleted() {
        let store = MemoryStore::new();
        let tables = Tables::from_config(&Config::test_default());
        store
            .put(&tables.users, json!({ "email": "owl@example.com" }).as_object().cloned().unwrap())
            .await
            .unwrap();

        let identity = Arc::new(FakeIdentity::default());
        let report = service(store.clone(), identity.clone())
            .delete_account(&payload())
            .await;

        assert!(report.identity_deleted);
        assert_eq!(report.tables.len(), 4);
        assert!(report.tables.iter().all(|t| t.error.is_none()));
        assert_eq!(report.tables[0].deleted, 1);
        assert!(store.is_empty(&tables.users.name));
        assert_eq!(*identity.deleted.lock().unwrap(), vec!["owl".to_string()]);
    }

    #[tokio::test]
    async fn failing_table_does_not_stop_the_rest() {
        let store = MemoryStore::new();
        let tables = Tables::from_config(&Config::test_default());
        for date in [20240101, 20240102] {
            store
                .put(
                    &tables.sleep_diary,
                    json!({ "email": "owl@example.com", "diaryDate": date })
                        .as_object()
                        .cloned()
                        .unwrap(),
                )
                .await
                .unwrap();
        }
        store.set_unavailable(&tables.users.name, true);

        let report = service(store.clone(), Arc::new(FakeIdentity::default()))
            .delete_account(&payload())
            .await;

        assert!(report.tables[0].error.is_some());
        assert_eq!(report.tables[1].deleted, 2);
        assert!(report.identity_deleted);
        assert!(store.is_empty(&tables.sleep_diary.name));
    }

    #[tokio::test]
    async fn composite_table_items_are_each_deleted() {
        let store = MemoryStore::new();
        let tables = Tables::from_config(&Config::test_default());
        for day in 1..=40 {
            store
                .put(
                    &tables.records,
                    json!({ "email": "owl@example.com", "taskId": format!("owl-20240101-{day}") })
                        .as_object()
                        .cloned()
                        .unwrap(),
                )
                .await
                .unwrap();
        }
        store
            .put(
                &tables.records,
                json!({ "email": "lark@example.com", "taskId": "lark-20240101-1" })
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
            .await
            .unwrap();

        let report = service(store.clone(), Arc::new(FakeIdentity::default()))
            .delete_account(&payload())
            .await;

        assert_eq!(report.tables[3].table, tables.records.name);
        assert_eq!(report.tables[3].deleted, 40);
        assert_eq!(store.len(&tables.records.name), 1);
    }

    #[tokio::test]
    async fn request_requires_identity_account() {
        let service = service(MemoryStore::new(), Arc::new(FakeIdentity::default()));
        let err = service.request("ghost@example.com", "ghost").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "User Not Found"));
        service.request("owl@example.com", "owl").await.unwrap();
    }
}
