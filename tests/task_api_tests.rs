// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task record endpoints.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::TestApp;

// 2024-03-15T00:00:00Z
const DAY_START: i64 = 1_710_460_800;
const DAY: i64 = 86_400;

async fn create(app: &TestApp, body: serde_json::Value) -> String {
    let resp = app.call("POST", "/task", Some(body)).await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.json);
    resp.json["body"]["taskId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_task_types() {
    let app = TestApp::new();
    let resp = app.call("GET", "/task/types", None).await;
    assert_eq!(
        resp.json["body"],
        json!({ "countOfTasks": 5, "taskType": [0, 1, 2, 3, 4] })
    );
}

#[tokio::test]
async fn test_create_derives_id_from_email_and_start_date() {
    let app = TestApp::new();
    let task_id = create(
        &app,
        json!({ "taskType": 3, "startTime": DAY_START + 3600, "elapsedTime": 900 }),
    )
    .await;
    assert!(task_id.starts_with("night.owl-20240315-"), "{task_id}");

    let resp = app.call("GET", "/task?all=true", None).await;
    assert_eq!(
        resp.json["body"],
        json!([{
            "taskId": task_id,
            "taskType": 3,
            "startTime": DAY_START + 3600,
            "elapsedTime": 900
        }])
    );
}

#[tokio::test]
async fn test_create_validation() {
    let app = TestApp::new();
    for body in [
        json!({ "taskType": 1 }),
        json!({ "taskType": 5, "startTime": DAY_START }),
        json!({ "elapsedTime": -1, "startTime": DAY_START }),
        json!({ "startTime": DAY_START, "note": "x" }),
        json!({ "startTime": "yesterday" }),
    ] {
        let resp = app.call("POST", "/task", Some(body.clone())).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{body}");
    }
    assert!(app.store.is_empty(&app.state.tables.records.name));
}

#[tokio::test]
async fn test_update_start_time_window() {
    let app = TestApp::new();
    let task_id = create(&app, json!({ "taskType": 0, "startTime": DAY_START + 7200 })).await;
    let uri = format!("/task/{task_id}");

    let resp = app
        .call("PUT", &uri, Some(json!({ "startTime": DAY_START })))
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app
        .call("PUT", &uri, Some(json!({ "startTime": DAY_START + DAY - 1 })))
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    for outside in [DAY_START - 1, DAY_START + DAY, DAY_START + DAY + 1] {
        let resp = app
            .call("PUT", &uri, Some(json!({ "startTime": outside })))
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "startTime {outside}");
    }

    let resp = app
        .call("GET", &format!("/task?taskId={task_id}"), None)
        .await;
    assert_eq!(resp.json["body"][0]["startTime"], DAY_START + DAY - 1);
}

#[tokio::test]
async fn test_update_missing_or_empty() {
    let app = TestApp::new();

    let resp = app
        .call(
            "PUT",
            "/task/night.owl-20240315-1710500000",
            Some(json!({ "elapsedTime": 10 })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let task_id = create(&app, json!({ "startTime": DAY_START })).await;
    let resp = app
        .call("PUT", &format!("/task/{task_id}"), Some(json!({})))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .call("PUT", "/task/not-a-task-id", Some(json!({ "elapsedTime": 10 })))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_filters() {
    let app = TestApp::new();
    create(&app, json!({ "taskType": 1, "startTime": DAY_START + 10 })).await;
    create(&app, json!({ "taskType": 2, "startTime": DAY_START + DAY + 10 })).await;

    let resp = app.call("GET", "/task?taskType=1", None).await;
    assert_eq!(resp.json["body"].as_array().unwrap().len(), 1);

    let resp = app.call("GET", "/task?taskId=&taskType=1", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["body"].as_array().unwrap().len(), 1);

    let resp = app
        .call("GET", &format!("/task?since={}", DAY_START + DAY), None)
        .await;
    let tasks = resp.json["body"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["taskType"], 2);

    let resp = app
        .call("GET", &format!("/task?taskType=1&since={}", DAY_START + DAY), None)
        .await;
    assert!(resp.json["body"].as_array().unwrap().is_empty());

    for uri in [
        "/task",
        "/task?all=false",
        "/task?all=maybe",
        "/task?taskType=abc",
        "/task?taskType=9",
        "/task?taskType=-1",
        "/task?taskId=",
    ] {
        let resp = app.call("GET", uri, None).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn test_delete_all_then_list_is_empty() {
    let app = TestApp::new();
    let first = create(&app, json!({ "startTime": DAY_START })).await;
    create(&app, json!({ "startTime": DAY_START + DAY })).await;

    let resp = app.call("DELETE", &format!("/task/{first}"), None).await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app.call("DELETE", "/task/*", None).await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app.call("GET", "/task?all=true", None).await;
    assert_eq!(resp.json["body"], json!([]));

    let resp = app.call("DELETE", "/task/*", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json["message"], "No data exists to delete");
}
