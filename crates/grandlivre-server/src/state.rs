use std::sync::Arc;

use grandlivre::agent::Agent;

/// Shared application state. The agent (and through it the model backend and
/// the store client) is built once at startup; request handlers only read it.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
}
