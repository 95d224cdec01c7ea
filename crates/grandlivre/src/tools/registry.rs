use serde_json::json;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::models::tool::Tool;

/// Record collections the query tool is allowed to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum TableName {
    Companies,
    Journals,
    JournalAccounts,
    JournalEntries,
    Accounts,
    CompanySettings,
    Regles,
}

/// Anomaly checks advertised to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum CheckType {
    UnbalancedBatches,
    DuplicateEntries,
    UnusualAmounts,
    MissingLettrage,
    OldDrafts,
}

/// Entry status filter for the balance tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StatusFilter {
    All,
    Draft,
    Posted,
}

fn enum_values<T>() -> Vec<String>
where
    T: IntoEnumIterator + AsRef<str>,
{
    T::iter().map(|value| value.as_ref().to_string()).collect()
}

/// The static tool list advertised to the model on every turn. The schema
/// enumerations are generated from the same enums the implementations
/// validate against, so the advertised schema and the runtime checks cannot
/// diverge.
pub fn definitions() -> Vec<Tool> {
    vec![
        Tool::new(
            "query_database",
            "Query the accounting database to retrieve accounting data. \
             Supports filtering, sorting, and pagination.",
            json!({
                "type": "object",
                "properties": {
                    "table": {
                        "type": "string",
                        "enum": enum_values::<TableName>(),
                        "description": "The table to query"
                    },
                    "filters": {
                        "type": "object",
                        "description": "Filters to apply (e.g., { \"status\": \"draft\", \"compte\": { \"like\": \"411%\" } })",
                        "additionalProperties": true
                    },
                    "select": {
                        "type": "string",
                        "description": "Columns to select (default: \"*\")"
                    },
                    "order": {
                        "type": "string",
                        "description": "Column to order by with direction (e.g., \"created_at.desc\")"
                    },
                    "limit": {
                        "type": "number",
                        "description": "Maximum number of rows to return"
                    }
                },
                "required": ["table"]
            }),
        ),
        Tool::new(
            "analyze_account_balance",
            "Calculate the balance of a specific account (debit - credit). \
             Returns debit total, credit total, balance, and number of entries.",
            json!({
                "type": "object",
                "properties": {
                    "company_id": {
                        "type": "string",
                        "description": "The company ID (UUID)"
                    },
                    "account_number": {
                        "type": "string",
                        "pattern": "^[0-9]{6}$",
                        "description": "The account number (6 digits, e.g., \"411000\")"
                    },
                    "status_filter": {
                        "type": "string",
                        "enum": enum_values::<StatusFilter>(),
                        "description": "Filter by entry status (default: \"all\")"
                    }
                },
                "required": ["account_number"]
            }),
        ),
        Tool::new(
            "detect_anomalies",
            "Detect anomalies in accounting entries such as unbalanced batches, \
             duplicate entries, unusual amounts, missing lettrage, or old drafts.",
            json!({
                "type": "object",
                "properties": {
                    "company_id": {
                        "type": "string",
                        "description": "The company ID (UUID)"
                    },
                    "check_types": {
                        "type": "array",
                        "items": {
                            "type": "string",
                            "enum": enum_values::<CheckType>()
                        },
                        "description": "Types of anomaly checks to perform"
                    }
                }
            }),
        ),
    ]
}
