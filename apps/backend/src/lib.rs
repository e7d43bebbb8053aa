pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod sessions;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use review_core::{CardStore, DueSelector, InMemoryCardStore};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::repository::DeckRepository;
use crate::sessions::SessionRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CardStore>,
    pub decks: Arc<dyn DeckRepository>,
    pub sessions: SessionRegistry,
    pub selector: DueSelector,
}

impl AppState {
    /// State backed by a single store serving both cards and decks.
    pub fn new<S>(store: Arc<S>, selector: DueSelector) -> Self
    where
        S: CardStore + DeckRepository + 'static,
    {
        Self {
            store: store.clone(),
            decks: store,
            sessions: SessionRegistry::new(),
            selector,
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(selector: DueSelector) -> Self {
        Self::new(Arc::new(InMemoryCardStore::new()), selector)
    }
}

/// Build the API router.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        // Deck routes
        .route("/api/decks", post(routes::decks::create))
        .route("/api/decks/:id", axum::routing::delete(routes::decks::delete))
        .route(
            "/api/decks/:id/cards",
            get(routes::decks::list_cards).post(routes::decks::add_card),
        )
        .route("/api/decks/:id/due", get(routes::decks::due))
        // Session routes
        .route("/api/sessions", post(routes::study::start))
        .route("/api/sessions/:id", get(routes::study::show))
        .route("/api/sessions/:id/flip", post(routes::study::flip))
        .route("/api/sessions/:id/answer", post(routes::study::answer))
        .route("/api/sessions/:id/abort", post(routes::study::abort));

    Router::new()
        .route("/health", get(health_check))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = match config.database_url.as_deref() {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let db = Database::connect(database_url).await?;

            tracing::info!("Running migrations...");
            db.run_migrations().await?;

            AppState::new(Arc::new(db), config.selector())
        }
        None => {
            tracing::warn!("DATABASE_URL not set, cards are kept in memory only");
            AppState::in_memory(config.selector())
        }
    };

    let addr = config.addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
