// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User document lifecycle: creation, reads and partial updates.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::db::{keys, Document, DocumentStore, FieldPath, ItemKey, TableSchema, UpdateExpression};
use crate::error::{AppError, Result};
use crate::models::user::REQUIRED_USER_FIELDS;
use crate::models::NewUser;
use crate::services::notifier::Notifier;
use crate::services::profiles::{user_not_found, ProfileService};
use crate::services::validation::{self, WhitelistMode};

pub struct UserService {
    store: Arc<dyn DocumentStore>,
    users: TableSchema,
    notifier: Arc<dyn Notifier>,
    account_created_topic: String,
    profiles: Arc<ProfileService>,
}

impl UserService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        users: TableSchema,
        notifier: Arc<dyn Notifier>,
        account_created_topic: String,
        profiles: Arc<ProfileService>,
    ) -> Self {
        Self {
            store,
            users,
            notifier,
            account_created_topic,
            profiles,
        }
    }

    /// Create the user document and announce it on the account-created topic.
    ///
    /// An existing document is never overwritten.
    pub async fn post_user(&self, email: &str, body: &Value) -> Result<()> {
        let fields = validation::as_object(body)?;
        validation::check_user_shape(fields)?;
        validation::check_whitelist(body, WhitelistMode::User)?;
        validation::check_user_attributes(fields)?;

        if let Some(missing) = REQUIRED_USER_FIELDS.iter().find(|f| !fields.contains_key(**f)) {
            tracing::debug!(email = %email, field = %missing, "Missing required user field");
            return Err(AppError::BadRequest("Bad Request. Invalid Input.".to_string()));
        }

        let user: NewUser = serde_json::from_value(body.clone()).map_err(|e| {
            tracing::debug!(email = %email, error = %e, "User body does not decode");
            AppError::BadRequest("Bad Request. Invalid Input.".to_string())
        })?;

        if self
            .store
            .get(&self.users, &ItemKey::partition(email))
            .await?
            .is_some()
        {
            tracing::warn!(email = %email, "User already exists");
            return Err(AppError::BadRequest("User Already Exist".to_string()));
        }

        let mut item = user_document(&user)?;
        item.insert(keys::EMAIL.to_string(), Value::from(email));
        self.store.put(&self.users, item.clone()).await?;
        tracing::info!(email = %email, "User created");

        let message_id = self
            .notifier
            .publish(&self.account_created_topic, &Value::Object(item))
            .await
            .map_err(|e| {
                tracing::error!(email = %email, error = %e, "Account-created publish failed");
                AppError::bad_request()
            })?;
        tracing::info!(email = %email, message_id = %message_id, "Account-created notification sent");
        Ok(())
    }

    /// Stored attributes minus the key, or an empty map when absent.
    pub async fn get_user(&self, email: &str) -> Result<Document> {
        Ok(self
            .store
            .get(&self.users, &ItemKey::partition(email))
            .await?
            .map(without_email)
            .unwrap_or_default())
    }

    /// Set top-level attributes; a nested `profile` is merged member by member.
    pub async fn put_user(&self, email: &str, body: &Value) -> Result<()> {
        let fields = validation::as_object(body)?;
        if fields.is_empty() {
            return Err(AppError::bad_request());
        }
        validation::check_whitelist(body, WhitelistMode::User)?;
        validation::check_user_attributes(fields)?;
        validation::check_user_shape(fields)?;

        let update = fields
            .iter()
            .filter(|(name, _)| name.as_str() != "profile")
            .fold(UpdateExpression::new(), |update, (name, value)| {
                update.set(FieldPath::field(name.as_str()), value.clone())
            });

        if !update.is_empty() {
            let updated = self
                .store
                .update(&self.users, &ItemKey::partition(email), &update)
                .await?;
            if updated.is_none() {
                tracing::warn!(email = %email, "Update of missing user");
                return Err(user_not_found());
            }
        }

        match fields.get("profile").and_then(Value::as_object) {
            Some(profile) => self.profiles.set_embedded_profile(email, profile).await,
            None => Ok(()),
        }
    }

    /// `PUT /user/profile`: merge into the embedded profile.
    pub async fn put_profile(&self, email: &str, body: &Value) -> Result<()> {
        validation::check_whitelist(body, WhitelistMode::Profile)?;
        let fields = validation::as_object(body)?;
        validation::check_profile_shape(fields)?;
        self.profiles.set_embedded_profile(email, fields).await
    }

    /// `PUT /user/profiles`: insert or update one list entry.
    pub async fn put_list_profile(&self, email: &str, body: &Value) -> Result<()> {
        validation::check_whitelist(body, WhitelistMode::ProfileEntry)?;
        let entry = validation::as_object(body)?;
        validation::check_profile_entry_shape(entry)?;
        self.profiles.upsert_list_profile(email, entry).await
    }
}

fn user_document(user: &NewUser) -> Result<Map<String, Value>> {
    match serde_json::to_value(user) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Internal(anyhow::anyhow!("user did not serialize to a map"))),
        Err(e) => Err(AppError::Internal(e.into())),
    }
}

pub(crate) fn without_email(mut item: Document) -> Document {
    item.remove(keys::EMAIL);
    item
}
