// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Guard for the internal `/tasks/*` callbacks.
//!
//! Cloud Run strips `x-cloudtasks-*` headers from external requests, so the
//! queue-name header is only present on deliveries from our own queue.

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};

use crate::config::DELETION_QUEUE_NAME;

const QUEUE_NAME_HEADER: &str = "x-cloudtasks-queuename";

/// Reject requests that were not delivered by the account-deletion queue.
pub async fn require_tasks_auth(request: Request, next: Next) -> Result<Response, StatusCode> {
    let queue_name_header = request.headers().get(QUEUE_NAME_HEADER);
    let is_valid_queue = queue_name_header
        .and_then(|h| h.to_str().ok())
        .is_some_and(|name| name == DELETION_QUEUE_NAME);

    if !is_valid_queue {
        tracing::warn!(
            header = ?queue_name_header,
            "Blocked tasks request with invalid queue header"
        );
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(request).await)
}
