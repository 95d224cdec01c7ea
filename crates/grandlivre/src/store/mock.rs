use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{Filter, FilterOp, SelectQuery, Store, StoreError};

/// In-memory store for tests. Applies filters and limits the way the REST
/// layer would, closely enough for the tool logic to be exercised offline.
/// Optionally fails any select for a given column list to simulate a
/// partial outage.
#[derive(Default)]
pub struct MockStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    fail_selecting: Mutex<Option<String>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    /// Every select whose column list equals `columns` will fail.
    pub fn fail_when_selecting(&self, columns: &str) {
        *self.fail_selecting.lock().unwrap() = Some(columns.to_string());
    }
}

fn as_number(value: &Value) -> Option<f64> {
    value.as_f64()
}

fn compare(field: &Value, target: &Value) -> Option<std::cmp::Ordering> {
    match (as_number(field), as_number(target)) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        // ISO-8601 timestamps compare correctly as strings
        _ => match (field.as_str(), target.as_str()) {
            (Some(a), Some(b)) => Some(a.cmp(b)),
            _ => None,
        },
    }
}

fn like_matches(field: &Value, pattern: &Value, case_insensitive: bool) -> bool {
    let (Some(field), Some(pattern)) = (field.as_str(), pattern.as_str()) else {
        return false;
    };
    let regex_pattern = format!(
        "^{}$",
        pattern
            .split('%')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*")
    );
    let regex_pattern = if case_insensitive {
        format!("(?i){}", regex_pattern)
    } else {
        regex_pattern
    };
    regex::Regex::new(&regex_pattern)
        .map(|re| re.is_match(field))
        .unwrap_or(false)
}

fn matches(row: &Value, filter: &Filter) -> bool {
    let null = Value::Null;
    let field = row.get(&filter.column).unwrap_or(&null);
    match filter.op {
        FilterOp::Eq => field == &filter.value,
        FilterOp::Neq => field != &filter.value,
        FilterOp::Gt => compare(field, &filter.value) == Some(std::cmp::Ordering::Greater),
        FilterOp::Gte => matches!(
            compare(field, &filter.value),
            Some(std::cmp::Ordering::Greater) | Some(std::cmp::Ordering::Equal)
        ),
        FilterOp::Lt => compare(field, &filter.value) == Some(std::cmp::Ordering::Less),
        FilterOp::Lte => matches!(
            compare(field, &filter.value),
            Some(std::cmp::Ordering::Less) | Some(std::cmp::Ordering::Equal)
        ),
        FilterOp::Like => like_matches(field, &filter.value, false),
        FilterOp::Ilike => like_matches(field, &filter.value, true),
        FilterOp::Is => field == &filter.value,
        FilterOp::In => filter
            .value
            .as_array()
            .map(|candidates| candidates.contains(field))
            .unwrap_or(false),
    }
}

#[async_trait]
impl Store for MockStore {
    async fn select(&self, query: SelectQuery) -> Result<Vec<Value>, StoreError> {
        if let Some(columns) = self.fail_selecting.lock().unwrap().as_deref() {
            if columns == query.columns {
                return Err(StoreError::Api {
                    status: 500,
                    message: "injected failure".to_string(),
                });
            }
        }

        let mut rows = self
            .tables
            .lock()
            .unwrap()
            .get(&query.table)
            .cloned()
            .unwrap_or_default();

        rows.retain(|row| query.filters.iter().all(|filter| matches(row, filter)));

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let null = Value::Null;
                let left = a.get(&order.column).unwrap_or(&null);
                let right = b.get(&order.column).unwrap_or(&null);
                let ordering = compare(left, right).unwrap_or(std::cmp::Ordering::Equal);
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }

        Ok(rows)
    }
}
