// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth access tokens for the Google REST APIs called over `reqwest`.
//!
//! Credentials are resolved the usual way (`GOOGLE_APPLICATION_CREDENTIALS`,
//! gcloud well-known file, then the metadata server), and the token is cached
//! by the generator until shortly before expiry.

use anyhow::Context;
use gcloud_sdk::{GoogleAuthTokenGenerator, TokenSourceType, GCP_DEFAULT_SCOPES};

/// Shared source of bearer tokens for outbound Google API calls.
pub struct AccessTokenSource {
    generator: GoogleAuthTokenGenerator,
}

impl AccessTokenSource {
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_source(TokenSourceType::Default).await
    }

    pub async fn with_source(source: TokenSourceType) -> anyhow::Result<Self> {
        let generator = GoogleAuthTokenGenerator::new(source, GCP_DEFAULT_SCOPES.clone())
            .await
            .context("failed resolving Google credentials")?;
        Ok(Self { generator })
    }

    /// Current access token, refreshed by the generator when near expiry.
    pub async fn token(&self) -> anyhow::Result<String> {
        let token = self
            .generator
            .create_token()
            .await
            .context("access token request failed")?;
        let value = token
            .token
            .sensitive_value_to_str()
            .context("access token is not UTF-8")?;
        Ok(value.to_string())
    }
}
