//! Two-tier query planning
//!
//! Document databases often cannot combine equality filters with ordering
//! on another field unless a composite index exists. The planner probes the
//! store first and, when the index is missing, runs the equality-only query
//! and applies ordering and limit in process. Both paths return the same
//! records in the same order.

use crate::compare::sort_records;
use crate::{DocumentStore, Query, Record, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPlan {
    /// The store serves filters, ordering and limit itself
    Indexed,
    /// The store serves filters only; ordering and limit run here
    ClientSide,
}

/// Choose a plan for `query` based on the store's capabilities
pub async fn plan_query(
    store: &dyn DocumentStore,
    collection: &str,
    query: &Query,
) -> Result<QueryPlan, StoreError> {
    if query.order_by.is_none() {
        return Ok(QueryPlan::Indexed);
    }
    if store.supports_query(collection, query).await? {
        Ok(QueryPlan::Indexed)
    } else {
        Ok(QueryPlan::ClientSide)
    }
}

/// Run `query` with the best available plan
pub async fn execute_query(
    store: &dyn DocumentStore,
    collection: &str,
    query: &Query,
) -> Result<Vec<Record>, StoreError> {
    match plan_query(store, collection, query).await? {
        QueryPlan::Indexed => match store.query(collection, query).await {
            Err(StoreError::IndexUnavailable { detail, .. }) => {
                tracing::warn!(
                    collection = %collection,
                    detail = %detail,
                    "Index missing despite capability probe, sorting client-side"
                );
                client_side(store, collection, query).await
            }
            other => other,
        },
        QueryPlan::ClientSide => {
            tracing::debug!(collection = %collection, "Using client-side ordering");
            client_side(store, collection, query).await
        }
    }
}

async fn client_side(
    store: &dyn DocumentStore,
    collection: &str,
    query: &Query,
) -> Result<Vec<Record>, StoreError> {
    let mut records = store.query(collection, &query.without_ordering()).await?;
    if let Some(order) = &query.order_by {
        sort_records(&mut records, order);
    }
    if let Some(limit) = query.limit {
        records.truncate(limit);
    }
    Ok(records)
}
