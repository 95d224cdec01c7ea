use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, warn};

use grandlivre::errors::AgentError;
use grandlivre::models::message::Message;

use crate::state::AppState;

// Convert incoming chat messages to our internal Message type. Only user and
// assistant turns are accepted from callers; anything else is dropped.
fn convert_messages(values: &[Value]) -> Vec<Message> {
    let mut messages = Vec::new();

    for value in values {
        let role = value
            .get("role")
            .and_then(|r| r.as_str())
            .unwrap_or_default();
        let content = value
            .get("content")
            .and_then(|c| c.as_str())
            .unwrap_or_default();

        match role {
            "user" => messages.push(Message::user().with_text(content)),
            "assistant" => messages.push(Message::assistant().with_text(content)),
            other => {
                warn!(role = other, "skipping message with unsupported role");
            }
        }
    }

    messages
}

async fn chat_handler(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let Some(messages) = body
        .get("messages")
        .and_then(|m| m.as_array())
        .filter(|m| !m.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Messages array is required"})),
        )
            .into_response();
    };

    let user_id = body.get("user_id").and_then(|v| v.as_str());
    let company_id = body.get("company_id").and_then(|v| v.as_str());
    let history = convert_messages(messages);

    match state.agent.reply(history, user_id, company_id).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(AgentError::Provider(detail)) => {
            // Detail goes to the log, not to the caller.
            error!(error = %detail, "model backend failure");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "Upstream model error",
                    "message": "Le service d'assistance est temporairement indisponible.",
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "chat request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                    "message": "Une erreur interne est survenue.",
                })),
            )
                .into_response()
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .with_state(state)
}
