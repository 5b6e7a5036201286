//! In-memory document store
//!
//! Used by the test suite and the local binary. It can be configured to
//! behave like a document database without composite indexes, to inject
//! failures, and to add latency, so the planner and resilience paths can be
//! exercised without a real backend.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::compare::{matches_filters, sort_by_id, sort_records};
use crate::{DocumentStore, Query, Record, StoreError, ID_FIELD, UPDATED_AT_FIELD, VERSION_FIELD};

type Collections = HashMap<String, BTreeMap<String, Record>>;

#[derive(Debug, Clone)]
pub struct MemoryStore {
    collections: Arc<Mutex<Collections>>,
    composite_indexes: bool,
    injected_failures: Arc<Mutex<VecDeque<StoreError>>>,
    post_commit_failures: Arc<Mutex<VecDeque<StoreError>>>,
    latency: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Store that can serve every query directly
    pub fn new() -> Self {
        Self {
            collections: Arc::new(Mutex::new(HashMap::new())),
            composite_indexes: true,
            injected_failures: Arc::new(Mutex::new(VecDeque::new())),
            post_commit_failures: Arc::new(Mutex::new(VecDeque::new())),
            latency: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Store that rejects filtered queries ordered by an unfiltered field
    pub fn without_composite_indexes() -> Self {
        Self {
            composite_indexes: false,
            ..Self::new()
        }
    }

    /// Delay every call by `latency` before touching the data
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next call fail with `err`. Failures queue up in order.
    pub fn fail_next(&self, err: StoreError) {
        self.injected_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(err);
    }

    /// Apply the next write, then report `err` as if the acknowledgement
    /// was lost on the way back. Reads are unaffected.
    pub fn fail_next_after_commit(&self, err: StoreError) {
        self.post_commit_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(err);
    }

    /// Number of store calls made so far, including failed ones
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of records in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.lock()
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or_default()
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Collections> {
        self.collections.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let injected = self
            .injected_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match injected {
            Some(err) => {
                tracing::debug!(error = %err, "Mock store returning injected failure");
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn after_commit(&self) -> Result<(), StoreError> {
        let injected = self
            .post_commit_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match injected {
            Some(err) => {
                tracing::debug!(error = %err, "Mock store dropping write acknowledgement");
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn apply_patch(
        &self,
        collection: &str,
        id: &str,
        updates: Record,
        expected_version: Option<u64>,
    ) -> Result<Record, StoreError> {
        let mut guard = self.lock();
        let record = guard
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        if let Some(expected) = expected_version {
            let actual = stored_version(record);
            if actual != Some(expected) {
                return Err(StoreError::Conflict {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    expected,
                    actual,
                });
            }
        }

        let stamp = !updates.contains_key(UPDATED_AT_FIELD);
        for (key, value) in updates {
            if key != ID_FIELD {
                record.insert(key, value);
            }
        }
        if stamp {
            record.insert(
                UPDATED_AT_FIELD.to_string(),
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }
        Ok(record.clone())
    }

    fn index_check(&self, collection: &str, query: &Query) -> Result<(), StoreError> {
        if !self.composite_indexes && query.needs_composite_index() {
            let fields: Vec<&str> = query.filters.iter().map(|f| f.field.as_str()).collect();
            let order = query
                .order_by
                .as_ref()
                .map(|o| o.field.as_str())
                .unwrap_or_default();
            return Err(StoreError::IndexUnavailable {
                collection: collection.to_string(),
                detail: format!("filter on {:?} ordered by {}", fields, order),
            });
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn stored_version(record: &Record) -> Option<u64> {
    record.get(VERSION_FIELD).and_then(Value::as_u64)
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn put(&self, collection: &str, id: &str, mut record: Record) -> Result<(), StoreError> {
        self.enter().await?;
        record.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        self.lock()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), record);
        self.after_commit()
    }

    async fn create(&self, collection: &str, id: &str, mut record: Record) -> Result<(), StoreError> {
        self.enter().await?;
        record.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        {
            let mut guard = self.lock();
            let records = guard.entry(collection.to_string()).or_default();
            if records.contains_key(id) {
                return Err(StoreError::AlreadyExists {
                    collection: collection.to_string(),
                    id: id.to_string(),
                });
            }
            records.insert(id.to_string(), record);
        }
        self.after_commit()
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Record, StoreError> {
        self.enter().await?;
        self.lock()
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Record>, StoreError> {
        self.enter().await?;
        self.index_check(collection, query)?;

        let mut records: Vec<Record> = self
            .lock()
            .get(collection)
            .map(|c| {
                c.values()
                    .filter(|r| matches_filters(r, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        match &query.order_by {
            Some(order) => sort_records(&mut records, order),
            None => sort_by_id(&mut records),
        }
        if let Some(limit) = query.limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    async fn patch(
        &self,
        collection: &str,
        id: &str,
        updates: Record,
        expected_version: Option<u64>,
    ) -> Result<Record, StoreError> {
        self.enter().await?;
        let patched = self.apply_patch(collection, id, updates, expected_version)?;
        self.after_commit()?;
        Ok(patched)
    }

    async fn supports_query(&self, _collection: &str, query: &Query) -> Result<bool, StoreError> {
        Ok(self.composite_indexes || !query.needs_composite_index())
    }
}
