// Export route modules
pub mod chat;
pub mod health;

use axum::Router;

use crate::state::AppState;

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(chat::routes(state.clone()))
        .merge(health::routes(state))
}
