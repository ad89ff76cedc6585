// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile sub-documents of a user.
//!
//! A user carries one embedded `profile` map and, for older clients, an
//! ordered `profiles` list addressed by position. At most one list entry is
//! `selected`. The store has no cross-index atomicity, so every list write is
//! read-then-update: two concurrent writers can both observe the same
//! selected entry and leave zero or several entries selected.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::db::{Document, DocumentStore, FieldPath, ItemKey, TableSchema, UpdateExpression};
use crate::error::{AppError, Result};
use crate::models::{ProfileCount, ProfileEntry};

/// Entry fields a list upsert may change on an existing entry.
const ENTRY_FIELDS: [&str; 4] = ["wakeUpTime", "sleepTime", "effectiveDays", "selected"];

const PROFILES: &str = "profiles";
const PROFILE: &str = "profile";

/// `profileId` meaning "every entry".
pub const ALL_PROFILES: &str = "*";

pub(crate) fn user_not_found() -> AppError {
    AppError::BadRequest("User Not Found".to_string())
}

pub struct ProfileService {
    store: Arc<dyn DocumentStore>,
    users: TableSchema,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DocumentStore>, users: TableSchema) -> Self {
        Self { store, users }
    }

    async fn load_user(&self, email: &str) -> Result<Document> {
        self.store
            .get(&self.users, &ItemKey::partition(email))
            .await?
            .ok_or_else(|| {
                tracing::warn!(email = %email, "User not found");
                user_not_found()
            })
    }

    async fn apply(&self, email: &str, update: UpdateExpression) -> Result<()> {
        match self
            .store
            .update(&self.users, &ItemKey::partition(email), &update)
            .await?
        {
            Some(_) => Ok(()),
            // Deleted between our read and this write.
            None => Err(user_not_found()),
        }
    }

    /// Merge `fields` into the embedded profile without touching its other
    /// members.
    pub async fn set_embedded_profile(&self, email: &str, fields: &Map<String, Value>) -> Result<()> {
        self.load_user(email).await?;
        if fields.is_empty() {
            return Ok(());
        }

        let update = fields.iter().fold(UpdateExpression::new(), |update, (name, value)| {
            update.set(FieldPath::field(PROFILE).member(name.as_str()), value.clone())
        });
        self.apply(email, update).await?;

        tracing::info!(email = %email, fields = fields.len(), "Embedded profile updated");
        Ok(())
    }

    pub async fn get_embedded_profile(&self, email: &str) -> Result<Value> {
        let user = self.load_user(email).await?;
        user.get(PROFILE).cloned().ok_or_else(|| {
            tracing::warn!(email = %email, "User has no profile");
            AppError::bad_request()
        })
    }

    /// Reset the embedded profile to an empty map.
    pub async fn clear_embedded_profile(&self, email: &str) -> Result<()> {
        let user = self.load_user(email).await?;
        if !user.contains_key(PROFILE) {
            tracing::warn!(email = %email, "User has no profile to clear");
            return Err(AppError::bad_request());
        }
        self.apply(
            email,
            UpdateExpression::new().set(FieldPath::field(PROFILE), Value::Object(Map::new())),
        )
        .await
    }

    /// Number and ids of list entries. `None` when the user does not exist.
    pub async fn count_profiles(&self, email: &str) -> Result<Option<ProfileCount>> {
        let Some(user) = self
            .store
            .get(&self.users, &ItemKey::partition(email))
            .await?
        else {
            return Ok(None);
        };

        let profile_id: Vec<String> = entry_ids(&user).into_iter().map(str::to_string).collect();
        Ok(Some(ProfileCount {
            count_of_profiles: profile_id.len(),
            profile_id,
        }))
    }

    /// Insert or update one list entry, keeping at most one entry selected.
    ///
    /// The written entry is authoritative for its own `selected` flag. Every
    /// other entry observed as selected is switched off.
    pub async fn upsert_list_profile(&self, email: &str, entry: &Map<String, Value>) -> Result<()> {
        let user = self.load_user(email).await?;

        let Some(existing) = user.get(PROFILES).and_then(Value::as_array) else {
            let created = new_entry(entry)?;
            tracing::info!(email = %email, id = %created.id, "Creating profiles list");
            return self
                .apply(
                    email,
                    UpdateExpression::new().set(FieldPath::field(PROFILES), vec![to_value(&created)?]),
                )
                .await;
        };

        let id = entry.get("id").and_then(Value::as_str).unwrap_or_default();
        let position = existing
            .iter()
            .position(|p| p.get("id").and_then(Value::as_str) == Some(id));
        let selecting = entry.get("selected").and_then(Value::as_bool) == Some(true);

        match position {
            None => {
                let created = new_entry(entry)?;
                if created.selected {
                    let clear = clear_selected(existing, None);
                    if clear.is_empty() {
                        tracing::warn!(email = %email, "No profile was selected before selecting a new one");
                    } else {
                        self.apply(email, clear).await?;
                    }
                }
                tracing::info!(email = %email, id = %created.id, "Appending profile");
                self.apply(
                    email,
                    UpdateExpression::new()
                        .append(FieldPath::field(PROFILES), vec![to_value(&created)?]),
                )
                .await
            }
            Some(index) => {
                let mut update = ENTRY_FIELDS
                    .iter()
                    .filter_map(|name| entry.get(*name).map(|value| (*name, value)))
                    .fold(UpdateExpression::new(), |update, (name, value)| {
                        update.set(
                            FieldPath::field(PROFILES).index(index).member(name),
                            value.clone(),
                        )
                    });
                if selecting {
                    for action in clear_selected(existing, Some(index)).actions() {
                        update.push(action.clone());
                    }
                }
                if update.is_empty() {
                    return Ok(());
                }
                tracing::info!(email = %email, id = %id, index, "Updating profile");
                self.apply(email, update).await
            }
        }
    }

    /// Remove one list entry by id, or every entry with `"*"`.
    pub async fn delete_profile(&self, email: &str, profile_id: &str) -> Result<()> {
        let user = self.load_user(email).await?;

        if profile_id == ALL_PROFILES {
            self.apply(email, UpdateExpression::new().remove(FieldPath::field(PROFILES)))
                .await?;
            self.apply(
                email,
                UpdateExpression::new().set(FieldPath::field(PROFILES), Value::Array(Vec::new())),
            )
            .await?;
            tracing::info!(email = %email, "Cleared profiles list");
            return Ok(());
        }

        let Some(index) = entry_ids(&user).iter().position(|id| *id == profile_id) else {
            tracing::warn!(email = %email, id = %profile_id, "Profile does not exist");
            return Err(AppError::bad_request());
        };

        self.apply(
            email,
            UpdateExpression::new().remove(FieldPath::field(PROFILES).index(index)),
        )
        .await?;
        tracing::info!(email = %email, id = %profile_id, index, "Deleted profile");
        Ok(())
    }
}

fn entry_ids(user: &Document) -> Vec<&str> {
    user.get(PROFILES)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|p| p.get("id").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

/// Full entry with unset schedule fields as null and `selected` defaulting
/// to false.
fn new_entry(entry: &Map<String, Value>) -> Result<ProfileEntry> {
    serde_json::from_value(Value::Object(entry.clone())).map_err(|e| {
        tracing::debug!(error = %e, "Malformed profile entry");
        AppError::bad_request()
    })
}

fn to_value(entry: &ProfileEntry) -> Result<Value> {
    serde_json::to_value(entry).map_err(|e| AppError::Internal(e.into()))
}

/// Switch off `selected` on every entry currently selected, except `keep`.
fn clear_selected(entries: &[Value], keep: Option<usize>) -> UpdateExpression {
    entries
        .iter()
        .enumerate()
        .filter(|(i, p)| Some(*i) != keep && p.get("selected") == Some(&Value::Bool(true)))
        .fold(UpdateExpression::new(), |update, (i, _)| {
            update.set(FieldPath::field(PROFILES).index(i).member("selected"), false)
        })
}
