use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

pub const SERVICE_NAME: &str = "grandlivre-ai-backend";

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "mode": state.agent.mode(),
    }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .with_state(state)
}
