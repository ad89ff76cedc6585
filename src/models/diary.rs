// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sleep-diary entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Attributes returned by diary listings.
pub const DIARY_PROJECTION: [&str; 6] = [
    "diaryDate",
    "sleepScore",
    "textMessage",
    "timeToSleep",
    "differenceTime",
    "disturbance",
];

pub const MAX_TIME_TO_SLEEP: i64 = 4;
pub const MAX_NUM_OF_WAKE_UP: i64 = 4;
pub const MAX_DIFFERENCE_TIME: i64 = 5;
pub const MAX_DISTURBANCE: i64 = 11;
pub const MAX_TEXT_MESSAGE_CHARS: usize = 255;
pub const MAX_SLEEP_SCORE: Decimal = Decimal::from_parts(50, 0, 0, false, 1);

/// Diary attributes. Every field is optional in a request body; `null` is
/// treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_sleep: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_of_wake_up: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disturbance: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_message: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub sleep_score: Option<Decimal>,
}

impl DiaryFields {
    pub fn is_empty(&self) -> bool {
        *self == DiaryFields::default()
    }
}
