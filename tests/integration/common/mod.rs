//! Common test utilities and fixtures for integration tests
//!
//! Every test builds the full application router over an in-memory store,
//! a mock account directory and a fixed clock, so no database is needed.
//! Tokens are minted with the same secret the router verifies with.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use eklavya_app::{create_app, Collaborators};
use eklavya_common::config::{Config, LogFormat, StoreBackend};
use eklavya_common::FixedClock;
use eklavya_directory::{AccountProfile, MockAccountDirectory, Role};
use eklavya_scribes::{ScribeProfile, ScribeRepository};
use eklavya_store::{DocumentStore, MemoryStore};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_only"; // pragma: allowlist secret

/// Wednesday 2026-10-21 10:00 UTC
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 21, 10, 0, 0).unwrap()
}

pub fn test_config() -> Config {
    Config {
        store_backend: StoreBackend::Memory,
        database_url: None,
        store_timeout_ms: 5000,
        store_max_retries: 1,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_issuer: None,
        jwt_audience: None,
        rust_log: "eklavya=debug".to_string(),
        log_format: LogFormat::Pretty,
        port: 0,
    }
}

/// Application under test plus handles on its collaborators
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub directory: MockAccountDirectory,
    pub clock: FixedClock,
    pub scribes: ScribeRepository,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// A store that cannot combine filters with ordering on another field
    pub fn without_composite_indexes() -> Self {
        Self::with_store(MemoryStore::without_composite_indexes())
    }

    fn with_store(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let dyn_store: Arc<dyn DocumentStore> = store.clone();
        let directory = MockAccountDirectory::new();
        let clock = FixedClock::new(test_now());

        let router = create_app(
            &test_config(),
            Collaborators {
                store: Arc::clone(&dyn_store),
                directory: Arc::new(directory.clone()),
                clock: Arc::new(clock.clone()),
            },
        );

        Self {
            router,
            store,
            directory,
            clock,
            scribes: ScribeRepository::new(dyn_store),
        }
    }

    pub fn create_student(&self, name: &str) -> AccountProfile {
        self.directory.add(name, Role::Student)
    }

    /// Scribe account plus a published profile
    pub async fn create_scribe(
        &self,
        name: &str,
        hourly_rate: Option<Decimal>,
        slots: &[&str],
    ) -> Result<AccountProfile> {
        let account = self.directory.add(name, Role::Scribe);
        let mut profile = ScribeProfile::new(account.id, name);
        profile.hourly_rate = hourly_rate;
        profile.slots = slots.iter().map(|s| s.to_string()).collect();
        profile.languages.insert("Hindi".to_string());
        profile.subjects.insert("Mathematics".to_string());
        self.scribes.upsert(&profile).await?;
        Ok(account)
    }

    pub async fn upsert_profile(&self, profile: &ScribeProfile) -> Result<()> {
        self.scribes.upsert(profile).await?;
        Ok(())
    }

    /// Send a request as `account`
    pub async fn send(
        &self,
        account: &AccountProfile,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        let jwt = create_test_jwt(account, TEST_JWT_SECRET).unwrap();
        let request = authed_request(method, uri, &jwt, body);
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Helper: build an authenticated request
pub fn authed_request(method: Method, uri: &str, jwt: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", jwt));

    match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Helper: parse response body as JSON Value
pub async fn parse_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Create an HS256 token for `account` the way the identity provider does
pub fn create_test_jwt(account: &AccountProfile, secret: &str) -> Result<String> {
    use jsonwebtoken::{Algorithm, EncodingKey, Header};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct TestClaims {
        sub: String,
        email: String,
        aud: String,
        iat: u64,
        exp: u64,
    }

    let now = Utc::now().timestamp() as u64;

    let claims = TestClaims {
        sub: account.id.to_string(),
        email: account.email.clone(),
        aud: "authenticated".to_string(),
        iat: now,
        exp: now + 3600, // 1 hour
    };

    let header = Header::new(Algorithm::HS256);
    let encoding_key = EncodingKey::from_secret(secret.as_ref());

    Ok(jsonwebtoken::encode(&header, &claims, &encoding_key)?)
}
