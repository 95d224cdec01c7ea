mod configuration;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use grandlivre::agent::Agent;
use grandlivre::providers::factory;
use grandlivre::store::supabase::SupabaseStore;
use grandlivre::tools::ToolExecutor;

use configuration::Settings;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let settings = Settings::new().context("invalid configuration")?;

    let store = SupabaseStore::new(settings.supabase.url.clone(), settings.supabase.key.clone())
        .context("failed to build the store client")?;
    let provider = factory::get_provider(settings.provider)?;
    let agent = Agent::new(provider, ToolExecutor::new(Arc::new(store)));

    let state = AppState {
        agent: Arc::new(agent),
    };

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state.clone()).layer(cors);

    let listener = tokio::net::TcpListener::bind(settings.server.socket_addr()).await?;
    info!("listening on {}", listener.local_addr()?);
    info!(mode = state.agent.mode(), "assistant backend ready");

    axum::serve(listener, app).await?;
    Ok(())
}
