pub mod anomalies;
pub mod balance;
pub mod executor;
pub mod query;
pub mod registry;

pub use executor::ToolExecutor;

use serde_json::{json, Value};

/// The uniform failure envelope every tool outcome collapses into.
pub(crate) fn failure<S: Into<String>>(message: S) -> Value {
    json!({"success": false, "error": message.into()})
}
