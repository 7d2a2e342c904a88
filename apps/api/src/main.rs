mod analysis;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod schedule;
mod scoring;
mod state;
mod summary;
mod uploads;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::ResultStore;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scoring::{KeywordDictionary, ResumeScorer};
use crate::state::AppState;
use crate::summary::{LlmSummarizer, NarrativeSummarizer, UnavailableSummarizer};

#[tokio::main]
async fn main() -> Result<()> {
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

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Keyword dictionary is fixed for the life of the process
    let dictionary = match &config.keywords_path {
        Some(path) => KeywordDictionary::from_json_file(path)
            .with_context(|| format!("Failed to load keywords from {}", path.display()))?,
        None => KeywordDictionary::builtin()?,
    };
    info!(
        "Keyword dictionary: {} skills, {} certifications",
        dictionary.skills.len(),
        dictionary.certifications.len()
    );
    if dictionary.skills.is_empty() && dictionary.certifications.is_empty() {
        warn!("Keyword dictionary has no terms; every résumé will score 0");
    }
    let scorer = ResumeScorer::new(dictionary);

    // Narrative summarizer (falls back to a fixed string when unavailable)
    let summarizer: Arc<dyn NarrativeSummarizer> = match &config.anthropic_api_key {
        Some(key) => {
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmSummarizer(LlmClient::new(key.clone())))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; narrative summaries disabled");
            Arc::new(UnavailableSummarizer)
        }
    };

    // Result store
    let store = ResultStore::load(&config.store_path);
    info!(
        "Result store at {} ({} records)",
        store.path().display(),
        store.len()
    );

    let state = AppState::new(store, scorer, summarizer, config.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
