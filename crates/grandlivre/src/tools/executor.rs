use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::{anomalies, balance, query};
use crate::models::tool::ToolCall;
use crate::store::Store;

/// Dispatch boundary for tool execution. No error crosses it: every outcome,
/// including store failures and unknown tool names, comes back as a result
/// envelope ready to be injected into the conversation.
pub struct ToolExecutor {
    store: Arc<dyn Store>,
}

impl ToolExecutor {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, call: &ToolCall) -> Value {
        info!(tool = %call.name, "executing tool");

        match call.name.as_str() {
            "query_database" => query::run(self.store.as_ref(), &call.arguments).await,
            "analyze_account_balance" => balance::run(self.store.as_ref(), &call.arguments).await,
            "detect_anomalies" => anomalies::run(self.store.as_ref(), &call.arguments).await,
            _ => super::failure(format!("Unknown tool: {}", call.name)),
        }
    }
}
