// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Cloud Run injects secrets as environment variables, so everything is read
//! once at startup.

use std::env;

/// Cloud Tasks queue carrying account-deletion hand-offs.
pub const DELETION_QUEUE_NAME: &str = "account-deletion";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID
    pub gcp_project_id: String,
    /// GCP region (Cloud Tasks location)
    pub gcp_region: String,
    /// Server port
    pub port: u16,
    /// Public base URL of this service (Cloud Tasks target and OIDC audience)
    pub api_url: String,
    /// Frontend URL for CORS
    pub frontend_url: String,

    /// JWT signing key for caller identity tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Identity Platform tenant holding end-user accounts
    pub identity_pool_id: String,
    /// Pub/Sub topic receiving account-created notifications
    pub account_created_topic: String,

    pub user_table: String,
    pub sleep_table: String,
    pub settings_table: String,
    pub records_table: String,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            gcp_region: env::var("GCP_REGION").unwrap_or_else(|_| "us-central1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            api_url: env::var("API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            identity_pool_id: env::var("IDENTITY_POOL_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_POOL_ID"))?,
            account_created_topic: env::var("ACCOUNT_CREATED_TOPIC")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("ACCOUNT_CREATED_TOPIC"))?,

            user_table: env::var("USER_TABLE").unwrap_or_else(|_| "users".to_string()),
            sleep_table: env::var("SLEEP_TABLE").unwrap_or_else(|_| "sleep".to_string()),
            settings_table: env::var("SETTINGS_TABLE").unwrap_or_else(|_| "settings".to_string()),
            records_table: env::var("RECORDS_TABLE").unwrap_or_else(|_| "records".to_string()),
        })
    }

    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            gcp_region: "us-central1".to_string(),
            port: 8080,
            api_url: "http://localhost:8080".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            identity_pool_id: "test-pool".to_string(),
            account_created_topic: "projects/test-project/topics/account-created".to_string(),
            user_table: "users".to_string(),
            sleep_table: "sleep".to_string(),
            settings_table: "settings".to_string(),
            records_table: "records".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
