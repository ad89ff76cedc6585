// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar dates. All dates are UTC.

use chrono::{DateTime, NaiveDate, Utc};

const DATE_FORMAT: &str = "%Y%m%d";

/// Length of the window a task's start time must fall in.
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Parse a `YYYYMMDD` string into a date.
pub fn parse_yyyymmdd(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

/// Integer `YYYYMMDD` form of a date, as stored in sort keys.
pub fn date_to_int(date: NaiveDate) -> i64 {
    // Always eight ASCII digits.
    date.format(DATE_FORMAT)
        .to_string()
        .parse()
        .unwrap_or_default()
}

/// Calendar date (UTC) containing a unix timestamp.
pub fn unix_to_date(unix: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(unix, 0).map(|dt| dt.date_naive())
}

/// Unix timestamp of midnight UTC starting `date`.
pub fn day_start_unix(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Current unix time in seconds.
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}
