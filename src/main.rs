// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sleeplog API Server
//!
//! Serves user profiles, sleep-diary entries and tasks for the sleep
//! tracking app, backed by Firestore.

use sleeplog_api::{
    config::Config,
    db::FirestoreStore,
    services::{AccessTokenSource, CloudTasksDelegate, IdentityPlatformClient, PubSubNotifier},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Sleeplog API");

    let store = FirestoreStore::new(&config.gcp_project_id).await?;
    tracing::info!(project = %config.gcp_project_id, "Firestore store initialized");

    // Outbound Google APIs share one cached access token.
    let tokens = Arc::new(AccessTokenSource::new().await?);
    let identity = IdentityPlatformClient::new(&config.gcp_project_id, tokens.clone());
    let notifier = PubSubNotifier::new(tokens);

    let delegate =
        CloudTasksDelegate::new(&config.gcp_project_id, &config.gcp_region, &config.api_url);
    tracing::info!(
        project = %config.gcp_project_id,
        region = %config.gcp_region,
        "Cloud Tasks delegate initialized"
    );

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(store),
        Arc::new(identity),
        Arc::new(notifier),
        Arc::new(delegate),
    ));

    // Build router
    let app = sleeplog_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sleeplog_api=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
