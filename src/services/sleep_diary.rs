// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sleep-diary entries keyed by (email, diaryDate).
//!
//! `diaryDate` is stored as the integer `YYYYMMDD`. Creation overwrites the
//! whole entry for that day; updates merge only the supplied fields.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::db::{
    keys, Document, DocumentStore, FieldPath, ItemKey, Query, SortCondition, TableSchema,
    UpdateExpression,
};
use crate::error::{AppError, Result};
use crate::models::diary::{
    DIARY_PROJECTION, MAX_DIFFERENCE_TIME, MAX_DISTURBANCE, MAX_NUM_OF_WAKE_UP,
    MAX_SLEEP_SCORE, MAX_TEXT_MESSAGE_CHARS, MAX_TIME_TO_SLEEP,
};
use crate::models::DiaryFields;
use crate::time_utils;

/// Path value meaning "every entry of the caller".
pub const ALL_ENTRIES: &str = "*";

pub struct DiaryService {
    store: Arc<dyn DocumentStore>,
    sleep_diary: TableSchema,
}

impl DiaryService {
    pub fn new(store: Arc<dyn DocumentStore>, sleep_diary: TableSchema) -> Self {
        Self { store, sleep_diary }
    }

    /// Write the full entry for the day named by the body's `diaryDate`.
    pub async fn create_or_replace_entry(&self, email: &str, body: &Value) -> Result<()> {
        let body = body.as_object().ok_or_else(AppError::bad_request)?;
        let raw_date = match body.get(keys::DIARY_DATE) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(AppError::bad_request()),
        };
        let diary_date = parse_diary_date(&raw_date)?;

        let mut fields = body.clone();
        fields.remove(keys::DIARY_DATE);
        let fields = diary_fields(&fields)?;

        let mut item = to_document(&fields)?;
        item.insert(keys::EMAIL.to_string(), Value::from(email));
        item.insert(keys::DIARY_DATE.to_string(), Value::from(diary_date));
        self.store.put(&self.sleep_diary, item).await?;

        tracing::info!(email = %email, diary_date, "Diary entry written");
        Ok(())
    }

    /// Merge the supplied fields into an existing entry.
    pub async fn update_entry(&self, email: &str, raw_date: &str, body: &Value) -> Result<()> {
        let diary_date = parse_diary_date(raw_date)?;
        let fields = diary_fields(body.as_object().ok_or_else(AppError::bad_request)?)?;
        if fields.is_empty() {
            return Err(AppError::bad_request());
        }

        let existing = self
            .store
            .query(
                &self.sleep_diary,
                &Query::partition(email)
                    .sort_condition(SortCondition::Eq(diary_date.into()))
                    .project(&[keys::DIARY_DATE]),
            )
            .await?;
        if existing.is_empty() {
            tracing::warn!(email = %email, diary_date, "Update of missing diary entry");
            return Err(AppError::bad_request());
        }

        let update = to_document(&fields)?
            .into_iter()
            .fold(UpdateExpression::new(), |update, (name, value)| {
                update.set(FieldPath::field(name), value)
            });
        let updated = self
            .store
            .update(&self.sleep_diary, &ItemKey::composite(email, diary_date), &update)
            .await?;
        if updated.is_none() {
            // Deleted since the existence query.
            return Err(AppError::bad_request());
        }

        tracing::info!(email = %email, diary_date, "Diary entry updated");
        Ok(())
    }

    /// Entries dated on or after the UTC day containing `since`.
    pub async fn list_entries(&self, email: &str, since: Option<&str>) -> Result<Vec<Document>> {
        let since: i64 = since
            .and_then(|s| s.parse().ok())
            .ok_or_else(AppError::bad_request)?;
        if since > time_utils::now_unix() {
            tracing::debug!(email = %email, since, "'since' is in the future");
            return Err(AppError::bad_request());
        }
        let from = time_utils::unix_to_date(since).ok_or_else(AppError::bad_request)?;

        let query = Query::partition(email)
            .sort_condition(SortCondition::Ge(time_utils::date_to_int(from).into()))
            .project(&DIARY_PROJECTION);
        Ok(self.store.query(&self.sleep_diary, &query).await?)
    }

    /// Delete one entry or, with `"*"`, every entry of the caller.
    pub async fn delete_entries(&self, email: &str, raw_date: &str) -> Result<usize> {
        let dates = if raw_date == ALL_ENTRIES {
            self.store
                .query(
                    &self.sleep_diary,
                    &Query::partition(email).project(&[keys::DIARY_DATE]),
                )
                .await?
                .iter()
                .filter_map(|item| item.get(keys::DIARY_DATE).and_then(Value::as_i64))
                .collect()
        } else {
            vec![parse_diary_date(raw_date)?]
        };

        let mut deleted = 0;
        for date in dates {
            if self
                .store
                .delete(&self.sleep_diary, &ItemKey::composite(email, date))
                .await?
                .is_some()
            {
                deleted += 1;
            }
        }

        if deleted == 0 {
            tracing::warn!(email = %email, diary_date = %raw_date, "No diary entry to delete");
            return Err(AppError::bad_request());
        }
        tracing::info!(email = %email, deleted, "Diary entries deleted");
        Ok(deleted)
    }
}

fn parse_diary_date(raw: &str) -> Result<i64> {
    time_utils::parse_yyyymmdd(raw)
        .map(time_utils::date_to_int)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid value error: 'date'(path) must be 'yyyyMMdd' date format, input 'date': {}",
                raw
            ))
        })
}

fn out_of_range(item: &str, limit: i64) -> String {
    format!("Invalid value error: '{}'(body) must be 0 to {}", item, limit)
}

fn int_up_to(value: &Value, limit: i64) -> bool {
    value.as_i64().is_some_and(|n| (0..=limit).contains(&n))
}

/// Range-check every present field and decode them.
///
/// All fields are checked; the reported error is that of the last failing
/// field in declaration order.
fn diary_fields(body: &Map<String, Value>) -> Result<DiaryFields> {
    let checks: [(&str, fn(&Value) -> bool, String); 6] = [
        (
            "timeToSleep",
            |v| int_up_to(v, MAX_TIME_TO_SLEEP),
            out_of_range("timeToSleep", MAX_TIME_TO_SLEEP),
        ),
        (
            "numOfWakeUp",
            |v| int_up_to(v, MAX_NUM_OF_WAKE_UP),
            out_of_range("numOfWakeUp", MAX_NUM_OF_WAKE_UP),
        ),
        (
            "differenceTime",
            |v| int_up_to(v, MAX_DIFFERENCE_TIME),
            out_of_range("differenceTime", MAX_DIFFERENCE_TIME),
        ),
        (
            "disturbance",
            |v| {
                v.as_array()
                    .is_some_and(|items| items.iter().all(|d| int_up_to(d, MAX_DISTURBANCE)))
            },
            format!("{} int array", out_of_range("disturbance", MAX_DISTURBANCE)),
        ),
        (
            "textMessage",
            |v| {
                v.as_str()
                    .is_some_and(|s| s.chars().count() <= MAX_TEXT_MESSAGE_CHARS)
            },
            format!(
                "Invalid value error: 'textMessage'(body) must not exceed {} characters.",
                MAX_TEXT_MESSAGE_CHARS
            ),
        ),
        (
            "sleepScore",
            |v| {
                v.as_f64()
                    .and_then(|f| Decimal::try_from(f).ok())
                    .is_some_and(|d| d >= Decimal::ZERO && d <= MAX_SLEEP_SCORE)
            },
            out_of_range("sleepScore", 5),
        ),
    ];

    let mut failure = None;
    for (field, check, message) in checks {
        match body.get(field) {
            Some(value) if !value.is_null() && !check(value) => failure = Some(message),
            _ => {}
        }
    }
    if let Some(message) = failure {
        return Err(AppError::BadRequest(message));
    }

    serde_json::from_value(Value::Object(body.clone())).map_err(|e| {
        tracing::debug!(error = %e, "Diary body does not decode");
        AppError::bad_request()
    })
}

fn to_document(fields: &DiaryFields) -> Result<Map<String, Value>> {
    match serde_json::to_value(fields) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Internal(anyhow::anyhow!("diary fields are not a map"))),
        Err(e) => Err(AppError::Internal(e.into())),
    }
}
