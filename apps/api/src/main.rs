mod analysis;
mod config;
mod db;
mod embedding;
mod errors;
mod models;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::extract::PdfTextExtractor;
use crate::analysis::pacer::FixedDelayPacer;
use crate::analysis::pipeline::RankingPipeline;
use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::EmbeddingClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{PgSessionStore, SessionStore};

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

    info!("Starting Sift API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and the session store
    let pool = create_pool(&config.database_url).await?;
    let sessions = PgSessionStore::new(pool);
    sessions
        .ensure_schema()
        .await
        .context("schema setup failed")?;
    let sessions: Arc<dyn SessionStore> = Arc::new(sessions);

    // Initialize the embedding client
    let embeddings = EmbeddingClient::new(config.huggingface_api_key.clone());
    info!("Embedding client initialized (model: {})", embedding::MODEL);

    // Assemble the ranking pipeline: PDF extraction, paced embedding calls
    let pipeline = Arc::new(RankingPipeline::new(
        Arc::new(embeddings),
        Arc::new(PdfTextExtractor),
        Arc::new(FixedDelayPacer::default()),
    ));

    // Build app state
    let state = AppState { pipeline, sessions };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
