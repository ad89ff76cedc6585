// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod diary;
pub mod settings;
pub mod task;
pub mod user;

pub use diary::DiaryFields;
pub use settings::DeviceCapabilities;
pub use task::{TaskFields, TaskId, TaskTypeList};
pub use user::{ClockTime, Gps, NewUser, Problem, Profile, ProfileCount, ProfileEntry};
