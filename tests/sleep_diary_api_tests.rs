// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sleep-diary endpoints.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::TestApp;

// 2024-01-01T00:00:00Z
const JAN_1: i64 = 1_704_067_200;

#[tokio::test]
async fn test_update_is_partial_merge() {
    let app = TestApp::new();
    let resp = app
        .call(
            "POST",
            "/sleep-diary",
            Some(json!({ "diaryDate": "20240101", "sleepScore": 4.5, "timeToSleep": 2 })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app
        .call(
            "PUT",
            "/sleep-diary/20240101",
            Some(json!({ "textMessage": "slept well" })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app
        .call("GET", &format!("/sleep-diary?since={JAN_1}"), None)
        .await;
    assert_eq!(
        resp.json["body"],
        json!([{
            "diaryDate": 20240101,
            "sleepScore": 4.5,
            "timeToSleep": 2,
            "textMessage": "slept well"
        }])
    );
}

#[tokio::test]
async fn test_create_overwrites_whole_entry() {
    let app = TestApp::new();
    app.call(
        "POST",
        "/sleep-diary",
        Some(json!({ "diaryDate": 20240101, "textMessage": "first", "numOfWakeUp": 3 })),
    )
    .await;
    app.call(
        "POST",
        "/sleep-diary",
        Some(json!({ "diaryDate": "20240101", "differenceTime": 1 })),
    )
    .await;

    let resp = app
        .call("GET", &format!("/sleep-diary?since={JAN_1}"), None)
        .await;
    assert_eq!(
        resp.json["body"],
        json!([{ "diaryDate": 20240101, "differenceTime": 1 }])
    );
}

#[tokio::test]
async fn test_list_since_rules() {
    let app = TestApp::new();
    for date in ["20231231", "20240101", "20240102"] {
        app.call(
            "POST",
            "/sleep-diary",
            Some(json!({ "diaryDate": date, "timeToSleep": 1 })),
        )
        .await;
    }

    // Midday on Jan 1 still includes Jan 1.
    let resp = app
        .call("GET", &format!("/sleep-diary?since={}", JAN_1 + 43_200), None)
        .await;
    let dates: Vec<i64> = resp.json["body"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["diaryDate"].as_i64().unwrap())
        .collect();
    assert_eq!(dates, vec![20240101, 20240102]);

    let future = chrono::Utc::now().timestamp() + 600;
    let resp = app
        .call("GET", &format!("/sleep-diary?since={future}"), None)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.json.get("body").is_none());

    let resp = app.call("GET", "/sleep-diary", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validation_messages() {
    let app = TestApp::new();

    let resp = app
        .call(
            "POST",
            "/sleep-diary",
            Some(json!({ "diaryDate": "2024-01-01", "timeToSleep": 1 })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.json["message"],
        "Invalid value error: 'date'(path) must be 'yyyyMMdd' date format, input 'date': 2024-01-01"
    );

    let resp = app
        .call(
            "POST",
            "/sleep-diary",
            Some(json!({ "diaryDate": "20240101", "disturbance": [1, 12] })),
        )
        .await;
    assert_eq!(
        resp.json["message"],
        "Invalid value error: 'disturbance'(body) must be 0 to 11 int array"
    );

    let resp = app
        .call(
            "POST",
            "/sleep-diary",
            Some(json!({ "diaryDate": "20240101", "numOfWakeUp": 5, "differenceTime": 6 })),
        )
        .await;
    assert_eq!(
        resp.json["message"],
        "Invalid value error: 'differenceTime'(body) must be 0 to 5"
    );

    let resp = app
        .call(
            "POST",
            "/sleep-diary",
            Some(json!({ "diaryDate": "20240101", "sleepScore": 5.5 })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    assert!(app.store.is_empty(&app.state.tables.sleep_diary.name));
}

#[tokio::test]
async fn test_update_of_missing_entry_is_bad_request() {
    let app = TestApp::new();
    let resp = app
        .call(
            "PUT",
            "/sleep-diary/20240101",
            Some(json!({ "textMessage": "never written" })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty(&app.state.tables.sleep_diary.name));
}

#[tokio::test]
async fn test_delete_single_and_all() {
    let app = TestApp::new();
    for date in ["20240101", "20240102", "20240103"] {
        app.call(
            "POST",
            "/sleep-diary",
            Some(json!({ "diaryDate": date, "sleepScore": 3.0 })),
        )
        .await;
    }

    let resp = app.call("DELETE", "/sleep-diary/20240102", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    let resp = app.call("DELETE", "/sleep-diary/20240102", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app.call("DELETE", "/sleep-diary/*", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(app.store.is_empty(&app.state.tables.sleep_diary.name));

    let resp = app.call("DELETE", "/sleep-diary/*", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}
