// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer: document model, store contract and backends.

pub mod document;
pub mod firestore;
pub mod memory;
pub mod store;

pub use document::{Document, FieldPath, UpdateAction, UpdateExpression};
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use store::{
    DocumentStore, Filter, ItemKey, Query, SortCondition, SortKey, StoreError, TableSchema,
};

use crate::config::Config;

/// Key attribute names as constants.
pub mod keys {
    pub const EMAIL: &str = "email";
    pub const DIARY_DATE: &str = "diaryDate";
    pub const TASK_ID: &str = "taskId";
}

/// Schemas of every table the service owns.
#[derive(Debug, Clone)]
pub struct Tables {
    /// User profiles, keyed by email.
    pub users: TableSchema,
    /// Sleep-diary entries, keyed by (email, diaryDate).
    pub sleep_diary: TableSchema,
    /// Device settings, keyed by email.
    pub settings: TableSchema,
    /// Task records, keyed by (email, taskId).
    pub records: TableSchema,
}

impl Tables {
    pub fn from_config(config: &Config) -> Self {
        Self {
            users: TableSchema::simple(config.user_table.clone(), keys::EMAIL),
            sleep_diary: TableSchema::composite(
                config.sleep_table.clone(),
                keys::EMAIL,
                keys::DIARY_DATE,
            ),
            settings: TableSchema::simple(config.settings_table.clone(), keys::EMAIL),
            records: TableSchema::composite(config.records_table.clone(), keys::EMAIL, keys::TASK_ID),
        }
    }
}
