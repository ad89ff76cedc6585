// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task records and server-assigned task identifiers.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time_utils;

/// Recognized task types.
pub const TASK_TYPES: [i64; 5] = [0, 1, 2, 3, 4];

/// Attributes a task body may carry.
pub const TASK_FIELDS: [&str; 3] = ["taskType", "startTime", "elapsedTime"];

/// Attributes returned by task listings.
pub const TASK_PROJECTION: [&str; 4] = ["taskType", "taskId", "startTime", "elapsedTime"];

/// Client-writable task attributes. All optional in a request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<i64>,
}

/// Response body of `GET /tasks/types`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTypeList {
    pub count_of_tasks: usize,
    pub task_type: Vec<i64>,
}

impl Default for TaskTypeList {
    fn default() -> Self {
        Self {
            count_of_tasks: TASK_TYPES.len(),
            task_type: TASK_TYPES.to_vec(),
        }
    }
}

/// `{localPart}-{YYYYMMDD}-{serverUnixTime}`.
///
/// The local part may itself contain `-`, so parsing works from the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskId {
    pub owner: String,
    pub date: NaiveDate,
    pub created_at: i64,
}

impl TaskId {
    /// Identifier for a task owned by `email` starting at `start_time`,
    /// created at server time `now`.
    pub fn derive(email: &str, start_time: i64, now: i64) -> Option<Self> {
        let owner = email.split('@').next().unwrap_or_default().to_string();
        Some(Self {
            owner,
            date: time_utils::unix_to_date(start_time)?,
            created_at: now,
        })
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.rsplitn(3, '-');
        let created_at = parts.next()?.parse().ok()?;
        let date = time_utils::parse_yyyymmdd(parts.next()?)?;
        let owner = parts.next()?.to_string();
        Some(Self {
            owner,
            date,
            created_at,
        })
    }

    /// Half-open window `[dayStart, dayStart + 86400)` of the encoded date.
    pub fn day_window(&self) -> (i64, i64) {
        let start = time_utils::day_start_unix(self.date);
        (start, start + time_utils::SECONDS_PER_DAY)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.owner,
            self.date.format("%Y%m%d"),
            self.created_at
        )
    }
}
