mod config;
mod errors;
mod models;
mod routes;
mod scoring;
mod selection;
mod state;
mod suggestions;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::routes::build_router;
use crate::scoring::cache::ScoreCache;
use crate::scoring::dimensions::OverlapScorer;
use crate::selection::engine::SelectionEngine;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Relevance API v{}", env!("CARGO_PKG_VERSION"));

    // Load and validate engine configuration. Invalid weights abort start-up.
    let engine_config = config.engine_config()?;
    let mut engine = SelectionEngine::new(engine_config, Arc::new(OverlapScorer))?;
    info!("Selection engine initialized (scorer: {})", engine.scorer_backend());

    if config.score_cache_capacity > 0 {
        engine = engine.with_cache(Arc::new(ScoreCache::new(config.score_cache_capacity)));
        info!("Score cache enabled ({} entries)", config.score_cache_capacity);
    }

    let state = AppState {
        config: config.clone(),
        engine: Arc::new(engine),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
