use serde_json::{json, Value};
use std::str::FromStr;

use super::registry::TableName;
use crate::store::{FilterOp, SelectQuery, Store};

/// Generic filtered read over the allow-listed record collections.
///
/// Scalar filter values mean equality; a single-key object names the
/// comparison operator, e.g. `{ "compte": { "like": "411%" } }`.
pub async fn run(store: &dyn Store, input: &Value) -> Value {
    let table = match input.get("table").and_then(|t| t.as_str()) {
        Some(table) => table,
        None => return super::failure("table is required"),
    };
    if TableName::from_str(table).is_err() {
        return super::failure(format!("Unknown table: {}", table));
    }

    let columns = input
        .get("select")
        .and_then(|s| s.as_str())
        .unwrap_or("*");
    let mut query = SelectQuery::new(table).columns(columns);

    if let Some(filters) = input.get("filters").and_then(|f| f.as_object()) {
        for (column, value) in filters {
            match value {
                Value::Object(operator_map) => {
                    let Some((operator, operand)) = operator_map.iter().next() else {
                        continue;
                    };
                    let op = match FilterOp::from_str(operator) {
                        Ok(op) => op,
                        Err(_) => {
                            return super::failure(format!("Unknown filter operator: {}", operator))
                        }
                    };
                    query = query.filter(column, op, operand.clone());
                }
                scalar => query = query.eq(column, scalar.clone()),
            }
        }
    }

    if let Some(order) = input.get("order").and_then(|o| o.as_str()) {
        // "created_at.desc"; a bare column name defaults to ascending
        let (column, direction) = order.split_once('.').unwrap_or((order, "asc"));
        query = query.order(column, direction != "desc");
    }

    if let Some(limit) = input.get("limit").and_then(|l| l.as_u64()) {
        query = query.limit(limit as u32);
    }

    match store.select(query).await {
        Ok(data) => {
            let count = data.len();
            json!({
                "success": true,
                "data": data,
                "count": count,
            })
        }
        Err(e) => super::failure(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::MockStore;
    use serde_json::json;

    fn seeded_store() -> MockStore {
        let store = MockStore::new();
        store.insert(
            "journal_entries",
            vec![
                json!({"id": 1, "compte": "411000", "status": "draft", "montant": 100.0}),
                json!({"id": 2, "compte": "411200", "status": "posted", "montant": 250.0}),
                json!({"id": 3, "compte": "606100", "status": "draft", "montant": 75.5}),
            ],
        );
        store
    }

    #[tokio::test]
    async fn test_scalar_filter_means_equality() {
        let store = seeded_store();
        let result = run(
            &store,
            &json!({"table": "journal_entries", "filters": {"status": "draft"}}),
        )
        .await;

        assert_eq!(result["success"], json!(true));
        assert_eq!(result["count"], json!(2));
    }

    #[tokio::test]
    async fn test_operator_object_filter() {
        let store = seeded_store();
        let result = run(
            &store,
            &json!({"table": "journal_entries", "filters": {"compte": {"like": "411%"}}}),
        )
        .await;

        assert_eq!(result["success"], json!(true));
        assert_eq!(result["count"], json!(2));
        assert!(result["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|row| row["compte"].as_str().unwrap().starts_with("411")));
    }

    #[tokio::test]
    async fn test_order_and_limit() {
        let store = seeded_store();
        let result = run(
            &store,
            &json!({"table": "journal_entries", "order": "montant.desc", "limit": 1}),
        )
        .await;

        assert_eq!(result["count"], json!(1));
        assert_eq!(result["data"][0]["montant"], json!(250.0));
    }

    #[tokio::test]
    async fn test_bare_order_defaults_to_ascending() {
        let store = seeded_store();
        let result = run(&store, &json!({"table": "journal_entries", "order": "montant"})).await;

        assert_eq!(result["data"][0]["montant"], json!(75.5));
    }

    #[tokio::test]
    async fn test_table_outside_allow_list_is_rejected() {
        let store = seeded_store();
        let result = run(&store, &json!({"table": "users"})).await;

        assert_eq!(result["success"], json!(false));
        assert_eq!(result["error"], json!("Unknown table: users"));
    }

    #[tokio::test]
    async fn test_unknown_operator_is_rejected() {
        let store = seeded_store();
        let result = run(
            &store,
            &json!({"table": "journal_entries", "filters": {"montant": {"between": [0, 10]}}}),
        )
        .await;

        assert_eq!(result["success"], json!(false));
        assert_eq!(result["error"], json!("Unknown filter operator: between"));
    }

    #[tokio::test]
    async fn test_missing_table_is_rejected() {
        let store = seeded_store();
        let result = run(&store, &json!({})).await;

        assert_eq!(result["success"], json!(false));
    }

    #[tokio::test]
    async fn test_store_failure_becomes_envelope() {
        let store = seeded_store();
        store.fail_when_selecting("*");
        let result = run(&store, &json!({"table": "journal_entries"})).await;

        assert_eq!(result["success"], json!(false));
        assert!(result["error"].as_str().unwrap().contains("injected failure"));
    }
}
