//! Timeout and retry wrapper around any document store

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::{DocumentStore, Query, Record, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResilienceConfig {
    /// Upper bound on a single store call
    pub timeout: Duration,
    /// Extra attempts after a transient failure
    pub max_retries: u32,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_retries: 1,
        }
    }
}

/// Bounds every call with a timeout and retries transient failures
/// (`Unavailable`, `Timeout`) up to `max_retries` times.
///
/// A transient failure on a write does not mean the write was lost. A retried
/// `create` may then report `AlreadyExists` and a retried versioned `patch`
/// may report `Conflict` for the caller's own write; callers that care
/// re-read the record to tell the two cases apart.
#[derive(Clone)]
pub struct ResilientStore {
    inner: Arc<dyn DocumentStore>,
    config: ResilienceConfig,
}

impl ResilientStore {
    pub fn new(inner: Arc<dyn DocumentStore>, config: ResilienceConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> ResilienceConfig {
        self.config
    }

    async fn with_retry<T, F, Fut>(&self, op: &str, mut call: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.config.timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout(self.config.timeout)),
            };

            match result {
                Err(err) if err.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        operation = op,
                        attempt,
                        error = %err,
                        "Transient store failure, retrying"
                    );
                }
                other => return other,
            }
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for ResilientStore {
    async fn put(&self, collection: &str, id: &str, record: Record) -> Result<(), StoreError> {
        self.with_retry("put", || self.inner.put(collection, id, record.clone()))
            .await
    }

    async fn create(&self, collection: &str, id: &str, record: Record) -> Result<(), StoreError> {
        self.with_retry("create", || self.inner.create(collection, id, record.clone()))
            .await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Record, StoreError> {
        self.with_retry("get", || self.inner.get(collection, id))
            .await
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Record>, StoreError> {
        self.with_retry("query", || self.inner.query(collection, query))
            .await
    }

    async fn patch(
        &self,
        collection: &str,
        id: &str,
        updates: Record,
        expected_version: Option<u64>,
    ) -> Result<Record, StoreError> {
        self.with_retry("patch", || {
            self.inner
                .patch(collection, id, updates.clone(), expected_version)
        })
        .await
    }

    async fn supports_query(&self, collection: &str, query: &Query) -> Result<bool, StoreError> {
        self.with_retry("supports_query", || {
            self.inner.supports_query(collection, query)
        })
        .await
    }
}
