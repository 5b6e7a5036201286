//! Eklavya Persistent Store
//!
//! Durable create/read/update of JSON records grouped into collections, with
//! support for:
//! - Equality-filtered, sorted, limited queries
//! - Server-stamped partial updates with an optional version precondition
//! - A capability probe used by the two-tier query planner
//! - In-memory and Postgres (JSONB) backends, plus a timeout/retry wrapper

pub mod compare;
pub mod memory;
pub mod planner;
pub mod postgres;
pub mod resilient;

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryStore;
pub use planner::{execute_query, plan_query, QueryPlan};
pub use postgres::PgDocumentStore;
pub use resilient::{ResilienceConfig, ResilientStore};

/// A stored document: a JSON object whose `id` field mirrors its key
pub type Record = serde_json::Map<String, Value>;

/// Field holding the document key inside every record
pub const ID_FIELD: &str = "id";
/// Field checked by version preconditions
pub const VERSION_FIELD: &str = "version";
/// Field stamped by the store on every patch
pub const UPDATED_AT_FIELD: &str = "updatedAt";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Record already exists: {collection}/{id}")]
    AlreadyExists { collection: String, id: String },

    #[error("No index available for query on {collection}: {detail}")]
    IndexUnavailable { collection: String, detail: String },

    #[error("Version mismatch on {collection}/{id}: expected {expected}, found {actual:?}")]
    Conflict {
        collection: String,
        id: String,
        expected: u64,
        actual: Option<u64>,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid record: {0}")]
    InvalidData(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Transient failures are worth one more attempt; everything else is final
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout(_))
    }
}

/// Sort direction for ordered queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordering clause. Ties are always broken by document id ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// Equality filter on a top-level field
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

/// Collection query: equality filters, optional ordering, optional limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Order results by a field
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    /// Cap the number of results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The same filters with no ordering and no limit
    pub fn without_ordering(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            order_by: None,
            limit: None,
        }
    }

    /// Whether a document store needs a composite index to serve this query:
    /// equality filters combined with ordering on a field that is not filtered.
    pub fn needs_composite_index(&self) -> bool {
        match &self.order_by {
            Some(order) => {
                !self.filters.is_empty() && self.filters.iter().all(|f| f.field != order.field)
            }
            None => false,
        }
    }
}

/// Persistent Store collaborator
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create or replace a record
    async fn put(&self, collection: &str, id: &str, record: Record) -> Result<(), StoreError>;

    /// Insert a record only if the key is free. Fails with `AlreadyExists`
    /// when another record holds the key, leaving it untouched.
    async fn create(&self, collection: &str, id: &str, record: Record) -> Result<(), StoreError>;

    /// Fetch a record by key
    async fn get(&self, collection: &str, id: &str) -> Result<Record, StoreError>;

    /// Run a query. May fail with `IndexUnavailable` when the backend cannot
    /// combine the requested filters and ordering.
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Record>, StoreError>;

    /// Merge `updates` into the stored record and stamp `updatedAt` (a caller
    /// supplied `updatedAt` is kept as-is). With `expected_version`, fails with
    /// `Conflict` unless the stored `version` matches.
    async fn patch(
        &self,
        collection: &str,
        id: &str,
        updates: Record,
        expected_version: Option<u64>,
    ) -> Result<Record, StoreError>;

    /// Capability probe: can `query` serve this query directly?
    async fn supports_query(&self, collection: &str, query: &Query) -> Result<bool, StoreError>;
}
