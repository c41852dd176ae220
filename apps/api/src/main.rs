mod config;
mod db;
mod decks;
mod errors;
mod generation;
mod layout;
mod llm_client;
mod render;
mod routes;
mod state;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::decks::artifacts::S3ArtifactStore;
use crate::decks::postgres::PgDeckStore;
use crate::generation::generator::PairGenerator;
use crate::layout::CardLayoutEngine;
use crate::llm_client::LlmClient;
use crate::render::PageSettings;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Fails fast on missing or malformed env vars
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting deckgen v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Initialize upstream text generator
    let llm = LlmClient::new(&config.upstream)?;
    info!(
        "LLM client initialized (model: {}, timeout: {:?})",
        config.upstream.model, config.upstream.timeout
    );

    let layout = CardLayoutEngine::new(config.layout);
    let page_settings = PageSettings::default();
    let grid = layout.config();
    if !page_settings.fits_grid(grid) {
        let (width, height) = grid.grid_extent_mm();
        anyhow::bail!(
            "Card grid needs {width}x{height}mm but the page is {}x{}mm",
            page_settings.page_width_mm,
            page_settings.page_height_mm
        );
    }
    info!(
        "Card layout: {}x{}mm, {} per page",
        grid.card_width_mm,
        grid.card_height_mm,
        grid.capacity()
    );

    // Build app state
    let state = AppState {
        generator: PairGenerator::new(Arc::new(llm), config.pairs),
        layout,
        page_settings,
        decks: Arc::new(PgDeckStore::new(db)),
        artifacts: Arc::new(S3ArtifactStore::new(s3, config.s3_bucket.clone())),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "deckgen-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
