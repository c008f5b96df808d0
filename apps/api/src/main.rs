mod config;
mod editor;
mod errors;
mod extract;
mod generation;
mod llm_client;
mod models;
mod routes;
mod state;
mod templates;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::editor::sessions::EditorSessions;
use crate::generation::generator::LlmFieldGenerator;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::templates::fixtures::demo_templates;
use crate::templates::InMemoryTemplateStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Survey API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize template store (in-memory; contents do not survive a restart)
    let store = if config.seed_fixtures {
        let templates = demo_templates()?;
        info!("Template store seeded with {} demo templates", templates.len());
        InMemoryTemplateStore::with_templates(templates)
    } else {
        InMemoryTemplateStore::new()
    };

    // Initialize LLM client and generator
    let llm = LlmClient::new(config.gemini_api_key.clone(), &config.gemini_api_base)?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let generator = LlmFieldGenerator::new(llm);

    // Build app state
    let state = AppState {
        store: Arc::new(store),
        generator: Arc::new(generator),
        sessions: EditorSessions::new(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once a production front-end origin exists

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
