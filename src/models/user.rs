// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Recognized `problem` codes.
pub const PROBLEM_CODES: std::ops::RangeInclusive<i64> = 0..=7;

/// Recognized `sex` codes.
pub const SEX_CODES: [i64; 3] = [0, 1, 2];

/// Fields a new user must carry.
pub const REQUIRED_USER_FIELDS: [&str; 6] = ["userName", "problems", "age", "gps", "sex", "profile"];

/// Top-level attributes a client may write on a user.
pub const USER_ATTRIBUTES: [&str; 6] = ["userName", "problems", "age", "gps", "sex", "profile"];

/// User document as created by `POST /user`.
///
/// The email is the table key and is injected from the caller identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub user_name: String,
    pub problems: Vec<Problem>,
    pub age: i64,
    pub gps: Gps,
    pub sex: i64,
    pub profile: Profile,
}

/// One reported sleep problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub problem: i64,
    pub priority: i64,
}

/// Home location. Stored as decimals, published as plain numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gps {
    #[serde(with = "rust_decimal::serde::float")]
    pub latitude: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub longitude: Decimal,
}

/// Wall-clock time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    pub hh: u8,
    pub mm: u8,
}

/// The single embedded `profile` sub-document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wake_up_time: Option<ClockTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_time: Option<ClockTime>,
    /// Client-defined; stored as given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_days: Option<Value>,
}

/// Element of the legacy `profiles` list.
///
/// Unset schedule fields are stored as explicit nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEntry {
    pub id: String,
    pub wake_up_time: Option<ClockTime>,
    pub sleep_time: Option<ClockTime>,
    pub effective_days: Option<Value>,
    #[serde(default)]
    pub selected: bool,
}

/// Response body of `GET /user/profiles`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCount {
    pub count_of_profiles: usize,
    pub profile_id: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gps_decimals_serialize_as_numbers() {
        let gps: Gps = serde_json::from_value(json!({ "latitude": 37.5665, "longitude": 126.978 }))
            .unwrap();
        assert_eq!(gps.latitude, Decimal::new(375665, 4));

        let value = serde_json::to_value(gps).unwrap();
        assert_eq!(value["latitude"], json!(37.5665));
        assert_eq!(value["longitude"], json!(126.978));
    }

    #[test]
    fn partial_profile_serializes_only_present_fields() {
        let profile = Profile {
            wake_up_time: Some(ClockTime { hh: 7, mm: 30 }),
            ..Profile::default()
        };
        assert_eq!(
            serde_json::to_value(profile).unwrap(),
            json!({ "wakeUpTime": { "hh": 7, "mm": 30 } })
        );
    }

    #[test]
    fn profile_entry_keeps_nulls_for_unset_fields() {
        let entry: ProfileEntry = serde_json::from_value(json!({ "id": "weekday" })).unwrap();
        assert!(!entry.selected);
        assert_eq!(
            serde_json::to_value(entry).unwrap(),
            json!({
                "id": "weekday",
                "wakeUpTime": null,
                "sleepTime": null,
                "effectiveDays": null,
                "selected": false
            })
        );
    }
}
