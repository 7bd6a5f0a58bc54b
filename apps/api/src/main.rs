mod config;
mod errors;
mod interview;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::interview::content::{ContentService, LlmContentService, OfflineContentService};
use crate::interview::engine::InterviewServices;
use crate::interview::registry::SessionRegistry;
use crate::interview::store::InMemoryCandidateStore;
use crate::interview::timer::SystemClock;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("interview_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Remote content when a key is configured; otherwise every cascade runs locally.
    let content: Arc<dyn ContentService> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.remote_timeout)?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmContentService::new(llm))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; using local templates and keyword scoring only");
            Arc::new(OfflineContentService)
        }
    };

    let services = Arc::new(InterviewServices::new(
        content,
        Arc::new(InMemoryCandidateStore::new()),
        Arc::new(SystemClock),
        config.question_count,
        config.remote_timeout,
    ));
    info!(
        "Interview services ready: {} questions per session, {:?} remote timeout",
        config.question_count, config.remote_timeout
    );

    let state = AppState {
        services,
        registry: SessionRegistry::new(),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
