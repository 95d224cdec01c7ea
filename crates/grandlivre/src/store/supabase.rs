use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::{SelectQuery, Store, StoreError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// PostgREST read client for the hosted database.
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new<S: Into<String>>(base_url: S, api_key: S) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

/// Render a filter value the way PostgREST expects it on the query string:
/// strings bare, everything else in its JSON form (`null` included).
fn param_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Store for SupabaseStore {
    async fn select(&self, query: SelectQuery) -> Result<Vec<Value>, StoreError> {
        let url = format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            query.table
        );

        let mut params: Vec<(String, String)> =
            vec![("select".to_string(), query.columns.clone())];
        for filter in &query.filters {
            params.push((
                filter.column.clone(),
                format!("{}.{}", filter.op.as_ref(), param_value(&filter.value)),
            ));
        }
        if let Some(order) = &query.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }
        if let Some(limit) = query.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
