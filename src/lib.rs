// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sleeplog: backend for a personal sleep and wellness tracker.
//!
//! This crate provides the HTTP API for user profiles, daily sleep-diary
//! entries and timed tasks, stored in a document store, plus account
//! deletion across every table and the identity provider.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::{DocumentStore, Tables};
use services::{
    DeletionDelegate, DeletionService, DiaryService, IdentityProvider, Notifier, ProfileService,
    SettingsService, TaskService, UserService,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub tables: Tables,
    pub profiles: Arc<ProfileService>,
    pub users: UserService,
    pub settings: SettingsService,
    pub tasks: TaskService,
    pub diary: DiaryService,
    pub deletion: DeletionService,
}

impl AppState {
    /// Wire every service to one store and the external collaborators.
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
        delegate: Arc<dyn DeletionDelegate>,
    ) -> Self {
        let tables = Tables::from_config(&config);
        let profiles = Arc::new(ProfileService::new(store.clone(), tables.users.clone()));

        Self {
            users: UserService::new(
                store.clone(),
                tables.users.clone(),
                notifier,
                config.account_created_topic.clone(),
                profiles.clone(),
            ),
            settings: SettingsService::new(store.clone(), tables.settings.clone()),
            tasks: TaskService::new(store.clone(), tables.records.clone()),
            diary: DiaryService::new(store.clone(), tables.sleep_diary.clone()),
            deletion: DeletionService::new(
                store,
                tables.clone(),
                identity,
                delegate,
                config.identity_pool_id.clone(),
            ),
            profiles,
            tables,
            config,
        }
    }
}
