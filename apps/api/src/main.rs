mod config;
mod db;
mod errors;
mod evaluation;
mod llm_client;
mod models;
mod notifications;
mod routes;
mod scorecards;
mod state;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::notifications::smtp::SmtpNotifier;
use crate::routes::build_router;
use crate::scorecards::store::PgScorecardStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HireScore API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs pending migrations)
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgScorecardStore::new(db));

    // Initialize LLM client
    let llm = Arc::new(LlmClient::new(
        config.anthropic_api_key.clone(),
        config.llm_max_in_flight,
    )?);
    info!(
        "LLM client initialized (model: {}, max in flight: {})",
        llm_client::MODEL,
        config.llm_max_in_flight
    );

    // Initialize SMTP notifier
    let notifier = Arc::new(SmtpNotifier::new(&config.smtp)?);
    info!(
        "SMTP notifier initialized ({}:{})",
        config.smtp.host, config.smtp.port
    );

    // Build app state
    let state = AppState {
        llm,
        store,
        notifier,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the review UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
