//! Value ordering and filter matching shared by the in-memory backend and
//! the client-side query path.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{Filter, OrderBy, Record, SortDirection, ID_FIELD};

/// Total order over optional JSON values.
///
/// Missing values sort first. Numbers compare numerically; strings compare
/// as instants when both parse as RFC 3339, otherwise lexically.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_present(a, b),
    }
}

fn compare_present(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => match (parse_instant(x), parse_instant(y)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x.cmp(y),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn record_id(record: &Record) -> &str {
    record
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Sort records by `order`, breaking ties by id ascending
pub fn sort_records(records: &mut [Record], order: &OrderBy) {
    records.sort_by(|a, b| {
        let primary = compare_values(a.get(&order.field), b.get(&order.field));
        let primary = match order.direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };
        primary.then_with(|| record_id(a).cmp(record_id(b)))
    });
}

/// Sort records by id only
pub fn sort_by_id(records: &mut [Record]) {
    records.sort_by(|a, b| record_id(a).cmp(record_id(b)));
}

/// Whether a record satisfies every equality filter
pub fn matches_filters(record: &Record, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|f| record.get(&f.field).is_some_and(|v| v == &f.value))
}
