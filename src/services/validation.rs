// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request-body validation.
//!
//! Two independent passes run before any store access:
//! 1. [`check_whitelist`] walks the whole body and rejects any key, at any
//!    depth, outside the mode's allowed set.
//! 2. The shape checks test type and range of each known top-level field in a
//!    fixed order and stop at the first failure, naming the field and value.

use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::settings::{CONSENT_FLAGS, LANGUAGES, SETTINGS_ATTRIBUTES};
use crate::models::task::TASK_FIELDS;
use crate::models::user::{PROBLEM_CODES, SEX_CODES, USER_ATTRIBUTES};

const USER_KEYS: &[&str] = &[
    "userName",
    "problems",
    "problem",
    "priority",
    "age",
    "gps",
    "latitude",
    "longitude",
    "sex",
    "profile",
    "wakeUpTime",
    "hh",
    "mm",
    "sleepTime",
    "effectiveDays",
];

const PROFILE_KEYS: &[&str] = &["wakeUpTime", "hh", "mm", "sleepTime", "effectiveDays"];

const PROFILE_ENTRY_KEYS: &[&str] = &[
    "id",
    "selected",
    "wakeUpTime",
    "hh",
    "mm",
    "sleepTime",
    "effectiveDays",
];

const DEVICE_KEYS: &[&str] = &[
    "lang",
    "agreement",
    "termsAndCondition",
    "userInfoPrivacy",
    "userInfoCollectPrivacy",
    "gpsService",
    "marketingPolicy",
];

/// Which allowed-key set a body is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitelistMode {
    User,
    Profile,
    ProfileEntry,
    Device,
    Task,
}

impl WhitelistMode {
    fn allowed(self) -> &'static [&'static str] {
        match self {
            WhitelistMode::User => USER_KEYS,
            WhitelistMode::Profile => PROFILE_KEYS,
            WhitelistMode::ProfileEntry => PROFILE_ENTRY_KEYS,
            WhitelistMode::Device => DEVICE_KEYS,
            WhitelistMode::Task => &TASK_FIELDS,
        }
    }
}

/// Reject the body if any key at any depth is outside the mode's whitelist.
///
/// Descends into nested maps and into every element of nested lists.
pub fn check_whitelist(body: &Value, mode: WhitelistMode) -> Result<()> {
    if !body.is_object() {
        return Err(AppError::bad_request());
    }

    let allowed = mode.allowed();
    let mut stack = vec![body];
    while let Some(value) = stack.pop() {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if !allowed.contains(&key.as_str()) {
                        tracing::debug!(key = %key, mode = ?mode, "Rejected non-whitelisted key");
                        return Err(AppError::bad_request());
                    }
                    stack.push(child);
                }
            }
            Value::Array(items) => stack.extend(items),
            _ => {}
        }
    }
    Ok(())
}

/// Body as a JSON object, or Bad-Request.
pub fn as_object(body: &Value) -> Result<&Map<String, Value>> {
    body.as_object().ok_or_else(AppError::bad_request)
}

fn invalid_input(field: &str, value: &Value) -> AppError {
    AppError::BadRequest(format!("Invalid Input: {} -> {}", field, value))
}

fn int_in(value: &Value, range: std::ops::RangeInclusive<i64>) -> bool {
    value.as_i64().is_some_and(|n| range.contains(&n))
}

fn is_clock_time(value: &Value) -> bool {
    value.get("hh").is_some_and(|hh| int_in(hh, 0..=23))
        && value.get("mm").is_some_and(|mm| int_in(mm, 0..=59))
}

fn is_user_name(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| (1..=255).contains(&s.chars().count()))
}

fn is_problem_list(value: &Value) -> bool {
    let Some(problems) = value.as_array() else {
        return false;
    };
    let mut has_primary = false;
    for entry in problems {
        let code_ok = entry.get("problem").is_some_and(|p| int_in(p, PROBLEM_CODES));
        let Some(priority) = entry.get("priority").and_then(Value::as_i64) else {
            return false;
        };
        if !code_ok {
            return false;
        }
        has_primary |= priority == 1;
    }
    has_primary
}

fn is_profile(value: &Value) -> bool {
    let Some(profile) = value.as_object() else {
        return false;
    };
    ["wakeUpTime", "sleepTime"]
        .iter()
        .all(|name| profile.get(*name).map_or(true, is_clock_time))
}

fn is_gps(value: &Value) -> bool {
    ["latitude", "longitude"]
        .iter()
        .all(|name| value.get(*name).is_some_and(Value::is_number))
}

/// Shape/range pass for user bodies, in declaration order.
pub fn check_user_shape(body: &Map<String, Value>) -> Result<()> {
    let checks: [(&str, fn(&Value) -> bool); 6] = [
        ("userName", is_user_name),
        ("age", |v| int_in(v, 0..=150)),
        ("problems", is_problem_list),
        ("profile", is_profile),
        ("sex", |v| v.as_i64().is_some_and(|n| SEX_CODES.contains(&n))),
        ("gps", is_gps),
    ];

    for (field, check) in checks {
        if let Some(value) = body.get(field) {
            if !check(value) {
                return Err(invalid_input(field, value));
            }
        }
    }
    Ok(())
}

/// Every top-level key of a user body must be a user attribute.
pub fn check_user_attributes(body: &Map<String, Value>) -> Result<()> {
    match body.keys().find(|k| !USER_ATTRIBUTES.contains(&k.as_str())) {
        Some(key) => {
            tracing::debug!(key = %key, "Rejected nested-only key at top level");
            Err(AppError::bad_request())
        }
        None => Ok(()),
    }
}

/// Range pass for an embedded profile or a list entry's schedule fields.
pub fn check_profile_shape(profile: &Map<String, Value>) -> Result<()> {
    for field in ["wakeUpTime", "sleepTime"] {
        if let Some(value) = profile.get(field) {
            if !is_clock_time(value) {
                return Err(invalid_input(field, value));
            }
        }
    }
    Ok(())
}

/// Shape pass for a `profiles` list entry.
pub fn check_profile_entry_shape(entry: &Map<String, Value>) -> Result<()> {
    match entry.get("id") {
        Some(Value::String(id)) if !id.is_empty() && id != "*" => {}
        Some(other) => return Err(invalid_input("id", other)),
        None => return Err(AppError::bad_request()),
    }
    if let Some(selected) = entry.get("selected") {
        if !selected.is_boolean() {
            return Err(invalid_input("selected", selected));
        }
    }
    check_profile_shape(entry)
}

/// Settings body: language code, top-level keys, consent flags.
pub fn check_settings(body: &Map<String, Value>) -> Result<()> {
    if let Some(lang) = body.get("lang") {
        if !lang.is_null() && !lang.as_i64().is_some_and(|n| LANGUAGES.contains(&n)) {
            return Err(AppError::bad_request());
        }
    }

    if body.keys().any(|k| !SETTINGS_ATTRIBUTES.contains(&k.as_str())) {
        return Err(AppError::bad_request());
    }

    if let Some(agreement) = body.get("agreement") {
        let flags = agreement.as_object().ok_or_else(AppError::bad_request)?;
        for (flag, value) in flags {
            if !CONSENT_FLAGS.contains(&flag.as_str()) {
                return Err(AppError::BadRequest("Invalid Method".to_string()));
            }
            if !value.is_boolean() {
                return Err(invalid_input(flag, value));
            }
        }
    }
    Ok(())
}
