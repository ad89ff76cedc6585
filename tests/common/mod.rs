// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sleeplog_api::config::Config;
use sleeplog_api::db::{FirestoreStore, MemoryStore};
use sleeplog_api::middleware::auth::create_jwt;
use sleeplog_api::routes::create_router;
use sleeplog_api::services::{
    DeleteAccountPayload, DeletionDelegate, IdentityError, IdentityProvider, Notifier, NotifyError,
};
use sleeplog_api::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const EMAIL: &str = "night.owl@example.com";
pub const USER_NAME: &str = "night-owl";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a store backed by the Firestore emulator.
#[allow(dead_code)]
pub async fn test_firestore() -> FirestoreStore {
    FirestoreStore::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Identity provider that knows a fixed set of accounts.
#[derive(Default)]
pub struct FakeIdentity {
    pub unavailable: AtomicBool,
    pub deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn admin_get_user(&self, _pool: &str, user_name: &str) -> Result<(), IdentityError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::Unavailable("down".to_string()));
        }
        if user_name != USER_NAME {
            return Err(IdentityError::NotFound(user_name.to_string()));
        }
        Ok(())
    }

    async fn admin_delete_user(&self, _pool: &str, user_name: &str) -> Result<(), IdentityError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::Unavailable("down".to_string()));
        }
        self.deleted.lock().unwrap().push(user_name.to_string());
        Ok(())
    }
}

/// Notifier that records published messages.
#[derive(Default)]
pub struct FakeNotifier {
    pub fail: AtomicBool,
    pub published: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn publish(&self, topic: &str, message: &Value) -> Result<String, NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Topic(topic.to_string()));
        }
        let mut published = self.published.lock().unwrap();
        published.push((topic.to_string(), message.clone()));
        Ok(published.len().to_string())
    }
}

/// Deletion delegate that records hand-offs instead of queueing them.
#[derive(Default)]
pub struct FakeDelegate {
    pub fail: AtomicBool,
    pub handed_off: Mutex<Vec<DeleteAccountPayload>>,
}

#[async_trait]
impl DeletionDelegate for FakeDelegate {
    async fn hand_off(&self, payload: &DeleteAccountPayload) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("queue unavailable");
        }
        self.handed_off.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

/// Router wired to an in-memory store and fake collaborators.
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: MemoryStore,
    pub identity: Arc<FakeIdentity>,
    pub notifier: Arc<FakeNotifier>,
    pub delegate: Arc<FakeDelegate>,
}

/// Decoded response: HTTP status plus JSON envelope.
pub struct TestResponse {
    pub status: StatusCode,
    pub json: Value,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let identity = Arc::new(FakeIdentity::default());
        let notifier = Arc::new(FakeNotifier::default());
        let delegate = Arc::new(FakeDelegate::default());

        let state = Arc::new(AppState::new(
            Config::test_default(),
            Arc::new(store.clone()),
            identity.clone(),
            notifier.clone(),
            delegate.clone(),
        ));

        Self {
            router: create_router(state.clone()),
            state,
            store,
            identity,
            notifier,
            delegate,
        }
    }

    pub fn token(&self) -> String {
        create_jwt(EMAIL, USER_NAME, &self.state.config.jwt_signing_key).unwrap()
    }

    /// Send a request as the default test user.
    pub async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", self.token()))
            .header("content-type", "application/json");
        self.send(request, body).await
    }

    /// Send a prepared request builder.
    pub async fn send(
        &self,
        request: axum::http::request::Builder,
        body: Option<Value>,
    ) -> TestResponse {
        let body = match body {
            Some(value) => Body::from(serde_json::to_vec(&value).unwrap()),
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, json }
    }
}

/// A complete, valid `POST /user` body.
#[allow(dead_code)]
pub fn new_user_body() -> Value {
    serde_json::json!({
        "userName": "Night Owl",
        "problems": [ { "problem": 3, "priority": 1 }, { "problem": 5, "priority": 2 } ],
        "age": 41,
        "gps": { "latitude": 37.5665, "longitude": 126.978 },
        "sex": 2,
        "profile": {
            "wakeUpTime": { "hh": 6, "mm": 45 },
            "sleepTime": { "hh": 22, "mm": 30 },
            "effectiveDays": [1, 2, 3, 4, 5]
        }
    })
}
