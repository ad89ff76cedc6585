// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-device settings: display language and consent flags.

use serde::Serialize;

/// Supported display languages: 0 EN, 1 KR, 2 JP.
pub const LANGUAGES: [i64; 3] = [0, 1, 2];

/// Top-level attributes of a settings document.
pub const SETTINGS_ATTRIBUTES: [&str; 2] = ["lang", "agreement"];

/// Consent flags that may appear under `agreement`.
pub const CONSENT_FLAGS: [&str; 5] = [
    "termsAndCondition",
    "userInfoPrivacy",
    "userInfoCollectPrivacy",
    "gpsService",
    "marketingPolicy",
];

/// Response body of `GET /device/capabilities`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCapabilities {
    pub lang_cap: Vec<i64>,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            lang_cap: LANGUAGES.to_vec(),
        }
    }
}
