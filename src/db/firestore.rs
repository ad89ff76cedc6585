// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed document store.
//!
//! Each table is a collection. Items are stored as plain documents whose id is
//! derived from the item key, so point reads never need a query:
//! - `urlencode(partition)` for simple tables
//! - `urlencode(partition)_urlencode(sort)` for composite tables

use async_trait::async_trait;
use firestore::errors::{BackoffError, FirestoreError};
use futures_util::FutureExt;

use super::document::{Document, UpdateExpression};
use super::store::{
    check_key_untouched, updated_attributes, DocumentStore, ItemKey, Query, SortCondition,
    StoreError, TableSchema,
};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

impl FirestoreStore {
    /// Connect to Firestore.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        // The emulator accepts any token; skip the credential lookup entirely.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    async fn read(&self, table: &TableSchema, key: &ItemKey) -> Result<Option<Document>, StoreError> {
        self.client
            .fluent()
            .select()
            .by_id_in(&table.name)
            .obj::<Document>()
            .one(&document_id(key))
            .await
            .map_err(unavailable)
    }
}

/// Document id for an item key.
pub fn document_id(key: &ItemKey) -> String {
    let partition = urlencoding::encode(&key.partition);
    match &key.sort {
        Some(sort) => format!("{}_{}", partition, urlencoding::encode(&sort.to_string())),
        None => partition.into_owned(),
    }
}

fn unavailable(err: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

/// Recover the store error raised inside a transaction body.
fn from_transaction(err: FirestoreError) -> StoreError {
    match err {
        FirestoreError::ErrorInTransaction(inner) => match inner.source.downcast::<StoreError>() {
            Ok(store_err) => *store_err,
            Err(other) => unavailable(other),
        },
        other => StoreError::Unavailable(format!("Transaction failed: {}", other)),
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(
        &self,
        table: &TableSchema,
        key: &ItemKey,
    ) -> Result<Option<Document>, StoreError> {
        self.read(table, key).await
    }

    async fn put(&self, table: &TableSchema, item: Document) -> Result<(), StoreError> {
        let key = table.key_of(&item)?;
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(&table.name)
            .document_id(document_id(&key))
            .object(&item)
            .execute()
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn update(
        &self,
        table: &TableSchema,
        key: &ItemKey,
        update: &UpdateExpression,
    ) -> Result<Option<Document>, StoreError> {
        check_key_untouched(table, update)?;

        let collection = table.name.clone();
        let doc_id = document_id(key);
        let expression = update.clone();

        // The read goes through the transaction so a concurrent writer to the
        // same document forces a retry instead of a lost update.
        let updated = self
            .client
            .run_transaction(|db, transaction| {
                let collection = collection.clone();
                let doc_id = doc_id.clone();
                let expression = expression.clone();
                async move {
                    let current: Option<Document> = db
                        .fluent()
                        .select()
                        .by_id_in(&collection)
                        .obj::<Document>()
                        .one(&doc_id)
                        .await
                        .map_err(|e| BackoffError::permanent(unavailable(e)))?;
                    let Some(mut item) = current else {
                        return Ok(None);
                    };
                    expression.apply(&mut item).map_err(BackoffError::permanent)?;

                    db.fluent()
                        .update()
                        .in_col(&collection)
                        .document_id(&doc_id)
                        .object(&item)
                        .add_to_transaction(transaction)
                        .map_err(|e| BackoffError::permanent(unavailable(e)))?;
                    Ok::<_, BackoffError<StoreError>>(Some(item))
                }
                .boxed()
            })
            .await
            .map_err(from_transaction)?;

        Ok(updated.map(|item| updated_attributes(&item, update)))
    }

    async fn delete(
        &self,
        table: &TableSchema,
        key: &ItemKey,
    ) -> Result<Option<Document>, StoreError> {
        let collection = table.name.clone();
        let doc_id = document_id(key);

        self.client
            .run_transaction(|db, transaction| {
                let collection = collection.clone();
                let doc_id = doc_id.clone();
                async move {
                    let existing: Option<Document> = db
                        .fluent()
                        .select()
                        .by_id_in(&collection)
                        .obj::<Document>()
                        .one(&doc_id)
                        .await
                        .map_err(|e| BackoffError::permanent(unavailable(e)))?;
                    if existing.is_some() {
                        db.fluent()
                            .delete()
                            .from(collection.as_str())
                            .document_id(&doc_id)
                            .add_to_transaction(transaction)
                            .map_err(|e| BackoffError::permanent(unavailable(e)))?;
                    }
                    Ok::<_, BackoffError<StoreError>>(existing)
                }
                .boxed()
            })
            .await
            .map_err(from_transaction)
    }

    async fn query(&self, table: &TableSchema, query: &Query) -> Result<Vec<Document>, StoreError> {
        // An exact sort key is a point read.
        if let Some(SortCondition::Eq(sort)) = &query.sort {
            let key = ItemKey::composite(query.partition.clone(), sort.clone());
            let items = self.read(table, &key).await?.into_iter().collect();
            return Ok(query.finish(table, items));
        }

        let partition_key = table.partition_key;
        let partition = query.partition.clone();
        let items: Vec<Document> = self
            .client
            .fluent()
            .select()
            .from(table.name.as_str())
            .filter(move |q| q.for_all([q.field(partition_key).eq(partition.clone())]))
            .obj()
            .query()
            .await
            .map_err(unavailable)?;

        Ok(query.finish(table, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_ids_encode_both_key_parts() {
        assert_eq!(
            document_id(&ItemKey::partition("a.b+c@example.com")),
            "a.b%2Bc%40example.com"
        );
        assert_eq!(
            document_id(&ItemKey::composite("a@b.c", 20240101)),
            "a%40b.c_20240101"
        );
        assert_eq!(
            document_id(&ItemKey::composite("a@b.c", "a-20240101-1704067200")),
            "a%40b.c_a-20240101-1704067200"
        );
    }
}
