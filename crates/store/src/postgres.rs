//! Postgres-backed document store
//!
//! Records live in a single `documents` table keyed by (collection, id) with
//! the record itself in a JSONB `body` column. Equality filters use JSONB
//! containment, which the GIN index on `body` serves, so every query shape is
//! supported directly.

use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::{
    DocumentStore, Query, Record, SortDirection, StoreError, ID_FIELD, UPDATED_AT_FIELD,
    VERSION_FIELD,
};

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url`
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await.map_err(map_sqlx)?;
        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

fn map_sqlx(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
        other => StoreError::Backend(other.to_string()),
    }
}

fn into_record(body: Value) -> Result<Record, StoreError> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidData(format!(
            "expected a JSON object, found {}",
            other
        ))),
    }
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

/// Build the SELECT for a query. Placeholders: $1 collection, $2 containment
/// object, then $3 order field when ordering.
fn select_sql(query: &Query) -> String {
    let mut sql =
        String::from("SELECT body FROM documents WHERE collection = $1 AND body @> $2::jsonb");
    match &query.order_by {
        Some(order) => {
            let direction = match order.direction {
                SortDirection::Ascending => "ASC NULLS FIRST",
                SortDirection::Descending => "DESC NULLS LAST",
            };
            sql.push_str(&format!(" ORDER BY body -> $3 {}, id ASC", direction));
        }
        None => sql.push_str(" ORDER BY id ASC"),
    }
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    sql
}

fn containment(query: &Query) -> Value {
    let object: Record = query
        .filters
        .iter()
        .map(|f| (f.field.clone(), f.value.clone()))
        .collect();
    Value::Object(object)
}

#[async_trait::async_trait]
impl DocumentStore for PgDocumentStore {
    async fn put(&self, collection: &str, id: &str, mut record: Record) -> Result<(), StoreError> {
        record.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(record)))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn create(&self, collection: &str, id: &str, mut record: Record) -> Result<(), StoreError> {
        record.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(record)))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Record, StoreError> {
        let body = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?
        .ok_or_else(|| not_found(collection, id))?;
        into_record(body.0)
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Record>, StoreError> {
        let sql = select_sql(query);
        let mut statement = sqlx::query_scalar::<_, Json<Value>>(&sql)
            .bind(collection)
            .bind(Json(containment(query)));
        if let Some(order) = &query.order_by {
            statement = statement.bind(order.field.clone());
        }
        let rows = statement.fetch_all(&self.pool).await.map_err(map_sqlx)?;
        rows.into_iter().map(|body| into_record(body.0)).collect()
    }

    async fn patch(
        &self,
        collection: &str,
        id: &str,
        updates: Record,
        expected_version: Option<u64>,
    ) -> Result<Record, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        let body = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx)?
        .ok_or_else(|| not_found(collection, id))?;
        let mut record = into_record(body.0)?;

        if let Some(expected) = expected_version {
            let actual = record.get(VERSION_FIELD).and_then(Value::as_u64);
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
                Value::String(
                    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                ),
            );
        }

        sqlx::query(
            "UPDATE documents SET body = $3, updated_at = NOW() WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(record.clone())))
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        tx.commit().await.map_err(map_sqlx)?;
        Ok(record)
    }

    async fn supports_query(&self, _collection: &str, _query: &Query) -> Result<bool, StoreError> {
        Ok(true)
    }
}
