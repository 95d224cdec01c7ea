use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::warn;

use super::balance::round2;
use super::registry::CheckType;
use crate::store::{FilterOp, SelectQuery, Store};

/// Batches drift by rounding; only a difference above this is an anomaly.
const BALANCE_TOLERANCE: f64 = 0.01;
const DRAFT_AGE_DAYS: i64 = 30;
const UNUSUAL_AMOUNT_THRESHOLD: f64 = 10_000.0;
const DRAFT_BATCH_SAMPLE: usize = 10;
const UNUSUAL_ENTRY_SAMPLE: usize = 5;

/// Run the selected anomaly checks (default: all) and aggregate their
/// findings with a severity summary.
pub async fn run(store: &dyn Store, input: &Value) -> Value {
    let company_id = input.get("company_id").and_then(|c| c.as_str());

    let checks: Vec<CheckType> = match input.get("check_types").and_then(|c| c.as_array()) {
        Some(values) => values
            .iter()
            .filter_map(|v| v.as_str())
            .filter_map(|name| CheckType::from_str(name).ok())
            .collect(),
        None => CheckType::iter().collect(),
    };

    let mut anomalies = Vec::new();
    for check in checks {
        match check {
            CheckType::UnbalancedBatches => {
                anomalies.extend(unbalanced_batches(store, company_id).await)
            }
            CheckType::OldDrafts => anomalies.extend(old_drafts(store, company_id).await),
            CheckType::MissingLettrage => {
                anomalies.extend(missing_lettrage(store, company_id).await)
            }
            CheckType::UnusualAmounts => {
                anomalies.extend(unusual_amounts(store, company_id).await)
            }
            // Advertised in the schema but pending a product decision on what
            // counts as a duplicate (exact field match vs. amount/date
            // window); contributes nothing until that is settled.
            CheckType::DuplicateEntries => {}
        }
    }

    let count_severity = |severity: &str| -> usize {
        anomalies
            .iter()
            .filter(|a| a["severity"] == severity)
            .count()
    };
    let summary = json!({
        "total_anomalies": anomalies.len(),
        "high_severity": count_severity("high"),
        "medium_severity": count_severity("medium"),
        "low_severity": count_severity("low"),
    });

    json!({
        "success": true,
        "anomalies": anomalies,
        "summary": summary,
    })
}

/// Fetch rows for one check; a failure degrades that check to an empty
/// contribution instead of aborting the whole tool.
async fn fetch(store: &dyn Store, query: SelectQuery, check: &str) -> Vec<Value> {
    match store.select(query).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!(check, error = %e, "anomaly check skipped");
            Vec::new()
        }
    }
}

fn scoped(query: SelectQuery, company_id: Option<&str>) -> SelectQuery {
    match company_id {
        Some(id) => query.eq("company_id", json!(id)),
        None => query,
    }
}

async fn unbalanced_batches(store: &dyn Store, company_id: Option<&str>) -> Vec<Value> {
    let query = scoped(
        SelectQuery::new("journal_entries").columns("batch_id, s, montant"),
        company_id,
    );
    let rows = fetch(store, query, "unbalanced_batches").await;

    let mut batches: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for row in &rows {
        let batch_id = row
            .get("batch_id")
            .and_then(|b| b.as_str())
            .unwrap_or_default()
            .to_string();
        let amount = row.get("montant").and_then(|m| m.as_f64()).unwrap_or(0.0);
        let totals = batches.entry(batch_id).or_default();
        if row.get("s").and_then(|s| s.as_str()) == Some("D") {
            totals.0 += amount;
        } else {
            totals.1 += amount;
        }
    }

    batches
        .into_iter()
        .filter(|(_, (debit, credit))| (debit - credit).abs() > BALANCE_TOLERANCE)
        .map(|(batch_id, (debit, credit))| {
            json!({
                "type": "unbalanced_batches",
                "severity": "high",
                "description": format!("Lot {} déséquilibré", batch_id),
                "details": {
                    "batch_id": batch_id,
                    "debit": debit,
                    "credit": credit,
                    "difference": round2((debit - credit).abs()),
                }
            })
        })
        .collect()
}

async fn old_drafts(store: &dyn Store, company_id: Option<&str>) -> Vec<Value> {
    let cutoff = Utc::now() - Duration::days(DRAFT_AGE_DAYS);
    let query = scoped(
        SelectQuery::new("journal_entries")
            .columns("batch_id, created_at")
            .eq("status", json!("draft"))
            .filter("created_at", FilterOp::Lt, json!(cutoff.to_rfc3339())),
        company_id,
    );
    let rows = fetch(store, query, "old_drafts").await;

    let batches: BTreeSet<&str> = rows
        .iter()
        .filter_map(|row| row.get("batch_id").and_then(|b| b.as_str()))
        .collect();
    if batches.is_empty() {
        return Vec::new();
    }

    vec![json!({
        "type": "old_drafts",
        "severity": "medium",
        "description": format!(
            "{} lot(s) en brouillard depuis plus de {} jours",
            batches.len(),
            DRAFT_AGE_DAYS
        ),
        "details": {
            "count": batches.len(),
            "batches": batches.iter().take(DRAFT_BATCH_SAMPLE).collect::<Vec<_>>(),
        }
    })]
}

async fn missing_lettrage(store: &dyn Store, company_id: Option<&str>) -> Vec<Value> {
    let query = scoped(
        SelectQuery::new("journal_entries")
            .columns("compte, id")
            .filter("letter_code", FilterOp::Is, Value::Null)
            .eq("status", json!("posted")),
        company_id,
    );
    let rows = fetch(store, query, "missing_lettrage").await;

    let account_prefix = |row: &Value, prefix: &str| {
        row.get("compte")
            .and_then(|c| c.as_str())
            .map(|compte| compte.starts_with(prefix))
            .unwrap_or(false)
    };
    let clients = rows.iter().filter(|row| account_prefix(row, "411")).count();
    let fournisseurs = rows.iter().filter(|row| account_prefix(row, "401")).count();

    if clients == 0 && fournisseurs == 0 {
        return Vec::new();
    }

    vec![json!({
        "type": "missing_lettrage",
        "severity": "low",
        "description": format!(
            "{} écritures clients/fournisseurs non lettrées",
            clients + fournisseurs
        ),
        "details": {
            "clients": clients,
            "fournisseurs": fournisseurs,
        }
    })]
}

async fn unusual_amounts(store: &dyn Store, company_id: Option<&str>) -> Vec<Value> {
    let query = scoped(
        SelectQuery::new("journal_entries")
            .columns("id, compte, montant, libelle")
            .filter("montant", FilterOp::Gt, json!(UNUSUAL_AMOUNT_THRESHOLD)),
        company_id,
    );
    let rows = fetch(store, query, "unusual_amounts").await;

    if rows.is_empty() {
        return Vec::new();
    }

    let entries: Vec<Value> = rows
        .iter()
        .take(UNUSUAL_ENTRY_SAMPLE)
        .map(|row| {
            json!({
                "compte": row.get("compte").cloned().unwrap_or(Value::Null),
                "montant": row.get("montant").cloned().unwrap_or(Value::Null),
                "libelle": row.get("libelle").cloned().unwrap_or(Value::Null),
            })
        })
        .collect();

    vec![json!({
        "type": "unusual_amounts",
        "severity": "medium",
        "description": format!("{} écriture(s) avec montant > 10 000€", rows.len()),
        "details": {
            "count": rows.len(),
            "entries": entries,
        }
    })]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::MockStore;
    use serde_json::json;

    fn batch_entry(batch_id: &str, s: &str, montant: f64) -> Value {
        json!({"batch_id": batch_id, "s": s, "montant": montant, "status": "posted"})
    }

    fn draft_entry(batch_id: &str, days_ago: i64) -> Value {
        let created_at = (Utc::now() - Duration::days(days_ago)).to_rfc3339();
        json!({"batch_id": batch_id, "status": "draft", "created_at": created_at})
    }

    #[tokio::test]
    async fn test_unbalanced_batch_above_tolerance_is_flagged() {
        let store = MockStore::new();
        store.insert(
            "journal_entries",
            vec![
                batch_entry("LOT-1", "D", 150.0),
                batch_entry("LOT-1", "C", 149.98),
            ],
        );

        let result = run(&store, &json!({"check_types": ["unbalanced_batches"]})).await;

        let anomalies = result["anomalies"].as_array().unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0]["type"], "unbalanced_batches");
        assert_eq!(anomalies[0]["severity"], "high");
        assert_eq!(anomalies[0]["details"]["difference"], json!(0.02));
        assert_eq!(result["summary"]["high_severity"], json!(1));
    }

    #[tokio::test]
    async fn test_drift_within_tolerance_is_not_flagged() {
        let store = MockStore::new();
        store.insert(
            "journal_entries",
            vec![
                batch_entry("LOT-2", "D", 150.0),
                batch_entry("LOT-2", "C", 149.999),
            ],
        );

        let result = run(&store, &json!({"check_types": ["unbalanced_batches"]})).await;

        assert_eq!(result["summary"]["total_anomalies"], json!(0));
    }

    #[tokio::test]
    async fn test_old_drafts_counts_only_stale_batches() {
        let store = MockStore::new();
        store.insert(
            "journal_entries",
            vec![draft_entry("LOT-OLD", 45), draft_entry("LOT-FRESH", 10)],
        );

        let result = run(&store, &json!({"check_types": ["old_drafts"]})).await;

        let anomalies = result["anomalies"].as_array().unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0]["details"]["count"], json!(1));
        assert_eq!(anomalies[0]["details"]["batches"], json!(["LOT-OLD"]));
    }

    #[tokio::test]
    async fn test_old_drafts_sample_is_capped() {
        let store = MockStore::new();
        let rows = (0..15)
            .map(|i| draft_entry(&format!("LOT-{:02}", i), 60))
            .collect();
        store.insert("journal_entries", rows);

        let result = run(&store, &json!({"check_types": ["old_drafts"]})).await;

        let details = &result["anomalies"][0]["details"];
        assert_eq!(details["count"], json!(15));
        assert_eq!(details["batches"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_missing_lettrage_buckets_by_account_prefix() {
        let store = MockStore::new();
        store.insert(
            "journal_entries",
            vec![
                json!({"compte": "411000", "id": 1, "status": "posted"}),
                json!({"compte": "411200", "id": 2, "status": "posted"}),
                json!({"compte": "401000", "id": 3, "status": "posted"}),
                // already lettered, must not count
                json!({"compte": "411300", "id": 4, "status": "posted", "letter_code": "AA"}),
                // drafts are out of scope for lettering
                json!({"compte": "411400", "id": 5, "status": "draft"}),
            ],
        );

        let result = run(&store, &json!({"check_types": ["missing_lettrage"]})).await;

        let anomalies = result["anomalies"].as_array().unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0]["severity"], "low");
        assert_eq!(anomalies[0]["details"]["clients"], json!(2));
        assert_eq!(anomalies[0]["details"]["fournisseurs"], json!(1));
    }

    #[tokio::test]
    async fn test_unusual_amounts_reports_sample_of_five() {
        let store = MockStore::new();
        let rows = (0..8)
            .map(|i| {
                json!({
                    "id": i,
                    "compte": "606100",
                    "montant": 12_000.0 + i as f64,
                    "libelle": format!("Facture {}", i),
                })
            })
            .collect();
        store.insert("journal_entries", rows);

        let result = run(&store, &json!({"check_types": ["unusual_amounts"]})).await;

        let anomaly = &result["anomalies"][0];
        assert_eq!(anomaly["details"]["count"], json!(8));
        assert_eq!(anomaly["details"]["entries"].as_array().unwrap().len(), 5);
        assert_eq!(result["summary"]["medium_severity"], json!(1));
    }

    #[tokio::test]
    async fn test_amount_at_threshold_is_not_unusual() {
        let store = MockStore::new();
        store.insert(
            "journal_entries",
            vec![json!({"id": 1, "compte": "606100", "montant": 10_000.0, "libelle": "Loyer"})],
        );

        let result = run(&store, &json!({"check_types": ["unusual_amounts"]})).await;

        assert_eq!(result["summary"]["total_anomalies"], json!(0));
    }

    // One check losing its data fetch must not abort the others.
    #[tokio::test]
    async fn test_failed_check_degrades_without_aborting_the_rest() {
        let store = MockStore::new();
        store.insert(
            "journal_entries",
            vec![
                batch_entry("LOT-1", "D", 150.0),
                batch_entry("LOT-1", "C", 100.0),
                json!({"id": 9, "compte": "606100", "montant": 20_000.0, "libelle": "Travaux"}),
            ],
        );
        store.fail_when_selecting("batch_id, s, montant");

        let result = run(&store, &json!({})).await;

        assert_eq!(result["success"], json!(true));
        let anomalies = result["anomalies"].as_array().unwrap();
        assert!(anomalies.iter().all(|a| a["type"] != "unbalanced_batches"));
        assert!(anomalies.iter().any(|a| a["type"] == "unusual_amounts"));
    }

    #[tokio::test]
    async fn test_duplicate_entries_check_contributes_nothing() {
        let store = MockStore::new();
        store.insert(
            "journal_entries",
            vec![
                json!({"compte": "606100", "montant": 50.0, "libelle": "Dup", "date": "2025-01-01"}),
                json!({"compte": "606100", "montant": 50.0, "libelle": "Dup", "date": "2025-01-01"}),
            ],
        );

        let result = run(&store, &json!({"check_types": ["duplicate_entries"]})).await;

        assert_eq!(result["success"], json!(true));
        assert_eq!(result["summary"]["total_anomalies"], json!(0));
    }

    #[tokio::test]
    async fn test_summary_counts_by_severity() {
        let store = MockStore::new();
        store.insert(
            "journal_entries",
            vec![
                batch_entry("LOT-1", "D", 150.0),
                batch_entry("LOT-1", "C", 100.0),
                json!({"compte": "411000", "id": 1, "status": "posted"}),
                json!({"id": 2, "compte": "606100", "montant": 20_000.0, "libelle": "Travaux"}),
            ],
        );

        let result = run(&store, &json!({})).await;

        let summary = &result["summary"];
        assert_eq!(summary["high_severity"], json!(1));
        assert_eq!(summary["medium_severity"], json!(1));
        assert_eq!(summary["low_severity"], json!(1));
        assert_eq!(summary["total_anomalies"], json!(3));
    }
}
