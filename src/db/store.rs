// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document store contract shared by the Firestore and in-memory backends.

use std::cmp::Ordering;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use super::document::{Document, UpdateExpression};

/// Failures surfaced by a store backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Network, throttling, or permission failure. Never retried here.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The update expression does not fit the stored document.
    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    /// A stored item could not be decoded.
    #[error("malformed item: {0}")]
    Serialization(String),
}

/// Name and key layout of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub partition_key: &'static str,
    pub sort_key: Option<&'static str>,
}

impl TableSchema {
    /// Table keyed by partition key only.
    pub fn simple(name: impl Into<String>, partition_key: &'static str) -> Self {
        Self {
            name: name.into(),
            partition_key,
            sort_key: None,
        }
    }

    /// Table keyed by (partition key, sort key).
    pub fn composite(
        name: impl Into<String>,
        partition_key: &'static str,
        sort_key: &'static str,
    ) -> Self {
        Self {
            name: name.into(),
            partition_key,
            sort_key: Some(sort_key),
        }
    }

    /// Extract the key of a full item.
    pub fn key_of(&self, item: &Document) -> Result<ItemKey, StoreError> {
        let partition = item
            .get(self.partition_key)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                StoreError::Serialization(format!(
                    "item in '{}' lacks string key '{}'",
                    self.name, self.partition_key
                ))
            })?;

        let sort = match self.sort_key {
            Some(sort_key) => Some(
                item.get(sort_key)
                    .and_then(SortKey::from_value)
                    .ok_or_else(|| {
                        StoreError::Serialization(format!(
                            "item in '{}' lacks sort key '{}'",
                            self.name, sort_key
                        ))
                    })?,
            ),
            None => None,
        };

        Ok(ItemKey {
            partition: partition.to_string(),
            sort,
        })
    }

    fn sort_key_of(&self, item: &Document) -> Option<SortKey> {
        self.sort_key
            .and_then(|name| item.get(name))
            .and_then(SortKey::from_value)
    }
}

/// Sort-key value: diary dates are numbers, task ids are strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SortKey {
    Number(i64),
    Text(String),
}

impl SortKey {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(SortKey::Number),
            Value::String(s) => Some(SortKey::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Number(n) => write!(f, "{}", n),
            SortKey::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for SortKey {
    fn from(value: i64) -> Self {
        SortKey::Number(value)
    }
}

impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        SortKey::Text(value.to_string())
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        SortKey::Text(value)
    }
}

/// Primary key of one item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey {
    pub partition: String,
    pub sort: Option<SortKey>,
}

impl ItemKey {
    pub fn partition(partition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: None,
        }
    }

    pub fn composite(partition: impl Into<String>, sort: impl Into<SortKey>) -> Self {
        Self {
            partition: partition.into(),
            sort: Some(sort.into()),
        }
    }
}

/// Key condition on the sort key of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SortCondition {
    Eq(SortKey),
    Ge(SortKey),
}

impl SortCondition {
    pub fn matches(&self, key: &SortKey) -> bool {
        match self {
            SortCondition::Eq(expected) => key == expected,
            SortCondition::Ge(lower) => key >= lower,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ge,
}

/// Post-query attribute filter. Filters on one query are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub attribute: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn eq(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    pub fn ge(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            op: FilterOp::Ge,
            value: value.into(),
        }
    }

    pub fn matches(&self, item: &Document) -> bool {
        let Some(actual) = item.get(&self.attribute) else {
            return false;
        };
        match (self.op, compare_values(actual, &self.value)) {
            (FilterOp::Eq, Some(ordering)) => ordering == Ordering::Equal,
            (FilterOp::Ge, Some(ordering)) => ordering != Ordering::Less,
            (_, None) => false,
        }
    }
}

fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => match (l.as_i64(), r.as_i64()) {
            (Some(l), Some(r)) => Some(l.cmp(&r)),
            _ => l.as_f64()?.partial_cmp(&r.as_f64()?),
        },
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// Query within a single partition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub partition: String,
    pub sort: Option<SortCondition>,
    pub filters: Vec<Filter>,
    pub projection: Option<Vec<String>>,
}

impl Query {
    pub fn partition(partition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            ..Self::default()
        }
    }

    pub fn sort_condition(mut self, condition: SortCondition) -> Self {
        self.sort = Some(condition);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn project(mut self, attributes: &[&str]) -> Self {
        self.projection = Some(attributes.iter().map(|a| a.to_string()).collect());
        self
    }

    /// Apply sort-key condition, filters, ordering and projection to the raw
    /// items of a partition.
    pub fn finish(&self, schema: &TableSchema, mut items: Vec<Document>) -> Vec<Document> {
        items.retain(|item| {
            let sort_ok = match (&self.sort, schema.sort_key_of(item)) {
                (None, _) => true,
                (Some(condition), Some(key)) => condition.matches(&key),
                (Some(_), None) => false,
            };
            sort_ok && self.filters.iter().all(|f| f.matches(item))
        });
        items.sort_by_key(|item| schema.sort_key_of(item));

        match &self.projection {
            Some(attributes) => items
                .into_iter()
                .map(|item| {
                    item.into_iter()
                        .filter(|(name, _)| attributes.iter().any(|a| a == name))
                        .collect()
                })
                .collect(),
            None => items,
        }
    }
}

/// Subset of `item` holding the top-level attributes an update touched.
pub fn updated_attributes(item: &Document, update: &UpdateExpression) -> Document {
    update
        .touched_attributes()
        .into_iter()
        .filter_map(|name| item.get(&name).cloned().map(|value| (name, value)))
        .collect()
}

/// Rejects updates that would rewrite key attributes.
pub fn check_key_untouched(
    schema: &TableSchema,
    update: &UpdateExpression,
) -> Result<(), StoreError> {
    let touched = update.touched_attributes();
    let key_names = std::iter::once(schema.partition_key).chain(schema.sort_key);
    for name in key_names {
        if touched.contains(name) {
            return Err(StoreError::InvalidUpdate(format!(
                "key attribute '{}' cannot be updated",
                name
            )));
        }
    }
    Ok(())
}

/// Typed access to a document table.
///
/// Single-item operations are atomic. Nothing spans more than one item.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one item by key.
    async fn get(&self, table: &TableSchema, key: &ItemKey)
        -> Result<Option<Document>, StoreError>;

    /// Write a full item, replacing any existing item with the same key.
    async fn put(&self, table: &TableSchema, item: Document) -> Result<(), StoreError>;

    /// Partially update an existing item.
    ///
    /// Returns `None` when no item has this key (nothing is created), otherwise
    /// the new values of the top-level attributes the update touched.
    async fn update(
        &self,
        table: &TableSchema,
        key: &ItemKey,
        update: &UpdateExpression,
    ) -> Result<Option<Document>, StoreError>;

    /// Delete one item, returning it if it existed.
    async fn delete(&self, table: &TableSchema, key: &ItemKey)
        -> Result<Option<Document>, StoreError>;

    /// Items of one partition, ordered by sort key.
    async fn query(&self, table: &TableSchema, query: &Query) -> Result<Vec<Document>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn diary_table() -> TableSchema {
        TableSchema::composite("sleep", "email", "diaryDate")
    }

    #[test]
    fn key_of_reads_partition_and_sort_key() {
        let key = diary_table()
            .key_of(&item(json!({ "email": "a@b.c", "diaryDate": 20240101 })))
            .unwrap();
        assert_eq!(key, ItemKey::composite("a@b.c", 20240101));

        let missing = diary_table().key_of(&item(json!({ "email": "a@b.c" })));
        assert!(missing.is_err());
    }

    #[test]
    fn finish_orders_filters_and_projects() {
        let items = vec![
            item(json!({ "email": "a", "diaryDate": 20240103, "sleepScore": 3.0, "textMessage": "c" })),
            item(json!({ "email": "a", "diaryDate": 20240101, "sleepScore": 4.5, "textMessage": "a" })),
            item(json!({ "email": "a", "diaryDate": 20240102, "sleepScore": 1.0, "textMessage": "b" })),
        ];

        let query = Query::partition("a")
            .sort_condition(SortCondition::Ge(SortKey::Number(20240102)))
            .project(&["diaryDate", "textMessage"]);

        let result = query.finish(&diary_table(), items);
        assert_eq!(
            result,
            vec![
                item(json!({ "diaryDate": 20240102, "textMessage": "b" })),
                item(json!({ "diaryDate": 20240103, "textMessage": "c" })),
            ]
        );
    }

    #[test]
    fn filters_are_combined_with_and() {
        let table = TableSchema::composite("records", "email", "taskId");
        let items = vec![
            item(json!({ "email": "a", "taskId": "t1", "taskType": 1, "startTime": 100 })),
            item(json!({ "email": "a", "taskId": "t2", "taskType": 1, "startTime": 50 })),
            item(json!({ "email": "a", "taskId": "t3", "taskType": 2, "startTime": 200 })),
        ];

        let query = Query::partition("a")
            .filter(Filter::eq("taskType", 1))
            .filter(Filter::ge("startTime", 100));

        let result = query.finish(&table, items);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["taskId"], json!("t1"));
    }

    #[test]
    fn key_attributes_cannot_be_updated() {
        use super::super::document::FieldPath;

        let update = UpdateExpression::new().set(FieldPath::field("diaryDate"), 20240105);
        assert!(check_key_untouched(&diary_table(), &update).is_err());

        let update = UpdateExpression::new().set(FieldPath::field("textMessage"), "ok");
        assert!(check_key_untouched(&diary_table(), &update).is_ok());
    }
}
