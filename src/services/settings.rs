// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user device settings: language and consent flags.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::db::{keys, Document, DocumentStore, FieldPath, ItemKey, TableSchema, UpdateExpression};
use crate::error::Result;
use crate::services::users::without_email;
use crate::services::validation::{self, WhitelistMode};

pub struct SettingsService {
    store: Arc<dyn DocumentStore>,
    settings: TableSchema,
}

impl SettingsService {
    pub fn new(store: Arc<dyn DocumentStore>, settings: TableSchema) -> Self {
        Self { store, settings }
    }

    pub async fn get_settings(&self, email: &str) -> Result<Document> {
        Ok(self
            .store
            .get(&self.settings, &ItemKey::partition(email))
            .await?
            .map(without_email)
            .unwrap_or_default())
    }

    /// Create the settings document on first write, otherwise merge.
    pub async fn put_settings(&self, email: &str, body: &Value) -> Result<()> {
        let fields = validation::as_object(body)?;
        validation::check_settings(fields)?;
        validation::check_whitelist(body, WhitelistMode::Device)?;

        let key = ItemKey::partition(email);
        let update = merge_expression(fields);
        if !update.is_empty()
            && self
                .store
                .update(&self.settings, &key, &update)
                .await?
                .is_some()
        {
            tracing::info!(email = %email, "Settings updated");
            return Ok(());
        }

        if self.store.get(&self.settings, &key).await?.is_some() {
            // Empty body against an existing document.
            return Ok(());
        }

        let mut item = Map::new();
        item.insert(keys::EMAIL.to_string(), Value::from(email));
        item.insert(
            "lang".to_string(),
            fields.get("lang").cloned().unwrap_or(Value::Null),
        );
        item.insert(
            "agreement".to_string(),
            fields
                .get("agreement")
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
        );
        self.store.put(&self.settings, item).await?;
        tracing::info!(email = %email, "Settings created");
        Ok(())
    }
}

fn merge_expression(fields: &Map<String, Value>) -> UpdateExpression {
    let mut update = UpdateExpression::new();
    if let Some(lang) = fields.get("lang") {
        update = update.set(FieldPath::field("lang"), lang.clone());
    }
    if let Some(flags) = fields.get("agreement").and_then(Value::as_object) {
        for (flag, value) in flags {
            update = update.set(FieldPath::field("agreement").member(flag.as_str()), value.clone());
        }
    }
    update
}
