use serde_json::{json, Value};

use crate::store::{SelectQuery, Store};

/// Round a monetary amount half-up to 2 decimal places for presentation.
pub(crate) fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Sum the signed entries of one account: debit entries add, credit entries
/// subtract. The reported balance always equals round(debit) - round(credit).
pub async fn run(store: &dyn Store, input: &Value) -> Value {
    let account = match input.get("account_number").and_then(|a| a.as_str()) {
        Some(account) => account,
        None => return super::failure("account_number is required"),
    };

    let mut query = SelectQuery::new("journal_entries")
        .columns("s, montant, status")
        .eq("compte", json!(account));

    if let Some(company_id) = input.get("company_id").and_then(|c| c.as_str()) {
        query = query.eq("company_id", json!(company_id));
    }

    let status_filter = input
        .get("status_filter")
        .and_then(|s| s.as_str())
        .unwrap_or("all");
    if status_filter != "all" {
        query = query.eq("status", json!(status_filter));
    }

    let rows = match store.select(query).await {
        Ok(rows) => rows,
        Err(e) => return super::failure(e.to_string()),
    };

    let mut debit = 0.0;
    let mut credit = 0.0;
    for row in &rows {
        let amount = row.get("montant").and_then(|m| m.as_f64()).unwrap_or(0.0);
        match row.get("s").and_then(|s| s.as_str()) {
            Some("D") => debit += amount,
            Some("C") => credit += amount,
            _ => {}
        }
    }

    let debit = round2(debit);
    let credit = round2(credit);

    json!({
        "success": true,
        "account": account,
        "debit": debit,
        "credit": credit,
        "balance": round2(debit - credit),
        "entry_count": rows.len(),
    })
}
