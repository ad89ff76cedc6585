// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Used for local runs and tests. Each table lives in one `DashMap` shard, so
//! every single-item operation is atomic. Tables can be marked unavailable to
//! exercise the store-failure paths.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};

use super::document::{Document, UpdateExpression};
use super::store::{
    check_key_untouched, updated_attributes, DocumentStore, ItemKey, Query, StoreError,
    TableSchema,
};

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<DashMap<String, BTreeMap<ItemKey, Document>>>,
    unavailable: Arc<DashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation on `table` fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, table: &str, unavailable: bool) {
        if unavailable {
            self.unavailable.insert(table.to_string());
        } else {
            self.unavailable.remove(table);
        }
    }

    /// Number of items currently stored in `table`.
    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    fn check_available(&self, table: &TableSchema) -> Result<(), StoreError> {
        if self.unavailable.contains(&table.name) {
            return Err(StoreError::Unavailable(format!(
                "table '{}' is unavailable",
                table.name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(
        &self,
        table: &TableSchema,
        key: &ItemKey,
    ) -> Result<Option<Document>, StoreError> {
        self.check_available(table)?;
        Ok(self
            .tables
            .get(&table.name)
            .and_then(|items| items.get(key).cloned()))
    }

    async fn put(&self, table: &TableSchema, item: Document) -> Result<(), StoreError> {
        self.check_available(table)?;
        let key = table.key_of(&item)?;
        self.tables
            .entry(table.name.clone())
            .or_default()
            .insert(key, item);
        Ok(())
    }

    async fn update(
        &self,
        table: &TableSchema,
        key: &ItemKey,
        update: &UpdateExpression,
    ) -> Result<Option<Document>, StoreError> {
        self.check_available(table)?;
        check_key_untouched(table, update)?;

        let Some(mut items) = self.tables.get_mut(&table.name) else {
            return Ok(None);
        };
        let Some(item) = items.get_mut(key) else {
            return Ok(None);
        };

        update.apply(item)?;
        Ok(Some(updated_attributes(item, update)))
    }

    async fn delete(
        &self,
        table: &TableSchema,
        key: &ItemKey,
    ) -> Result<Option<Document>, StoreError> {
        self.check_available(table)?;
        Ok(self
            .tables
            .get_mut(&table.name)
            .and_then(|mut items| items.remove(key)))
    }

    async fn query(&self, table: &TableSchema, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.check_available(table)?;
        let items: Vec<Document> = self
            .tables
            .get(&table.name)
            .map(|items| {
                items
                    .iter()
                    .filter(|(key, _)| key.partition == query.partition)
                    .map(|(_, item)| item.clone())
                    .collect()
            })
            .unwrap_or_default();

        Ok(query.finish(table, items))
    }
}
