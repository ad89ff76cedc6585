// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod cloud_tasks;
pub mod deletion;
pub mod gcp_auth;
pub mod identity;
pub mod notifier;
pub mod profiles;
pub mod settings;
pub mod sleep_diary;
pub mod task_records;
pub mod users;
pub mod validation;

pub use cloud_tasks::{CloudTasksDelegate, DeleteAccountPayload, DeletionDelegate};
pub use deletion::{DeletionReport, DeletionService};
pub use gcp_auth::AccessTokenSource;
pub use identity::{IdentityError, IdentityPlatformClient, IdentityProvider};
pub use notifier::{Notifier, NotifyError, PubSubNotifier};
pub use profiles::ProfileService;
pub use settings::SettingsService;
pub use sleep_diary::DiaryService;
pub use task_records::{TaskListParams, TaskService};
pub use users::UserService;
