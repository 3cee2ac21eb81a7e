//! Axum HTTP surface.
//!
//! Three route groups share one [`AppContext`]: historical statistics
//! (`routes`, cached for an hour in the aggregation cache), live data
//! (`live`, cached by the API-Football client itself) and AI analysis
//! (`ai`, uncached). CORS is open so browser frontends can call it directly.

pub mod ai;
pub mod error;
pub mod live;
pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::cache::TtlCache;
use crate::config::AppConfig;
use crate::data::api_football::LiveDataClient;
use crate::data::fbref::FbrefScraper;
use crate::data::StatsProvider;
use crate::llm::ChatClient;
use error::ApiError;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Defaults applied when a request leaves a parameter out.
#[derive(Debug, Clone)]
pub struct Settings {
    pub current_season: String,
    pub head_to_head_seasons: Vec<String>,
    pub live_season: u16,
}

impl Settings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            current_season: cfg.history.current_season.clone(),
            head_to_head_seasons: cfg.history.head_to_head_seasons.clone(),
            live_season: cfg.live_data.default_season,
        }
    }
}

/// Everything a handler can reach. Built once at startup.
pub struct AppContext {
    pub stats: Arc<dyn StatsProvider>,
    pub live: LiveDataClient,
    pub chat: ChatClient,
    /// Aggregation cache for shaped historical responses.
    pub cache: TtlCache<Value>,
    pub settings: Settings,
}

pub type AppState = Arc<AppContext>;

impl AppContext {
    /// Wire up the production providers, resolving credentials from the
    /// environment. Missing credentials degrade features, not startup.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let live_key = AppConfig::resolve_secret(&cfg.live_data.api_key_env);
        let chat_key = AppConfig::resolve_secret(&cfg.llm.api_key_env);
        info!(
            live_data_configured = live_key.is_some(),
            chat_configured = chat_key.is_some(),
            "Resolved provider credentials"
        );

        let live = LiveDataClient::new(
            &cfg.live_data,
            live_key,
            TtlCache::new("live_data", cfg.cache.live_capacity, cfg.cache.live_ttl()),
        )
        .context("Failed to build API-Football client")?;

        Ok(Self {
            stats: Arc::new(FbrefScraper::new(&cfg.history)),
            live,
            chat: ChatClient::new(&cfg.llm, chat_key)?,
            cache: TtlCache::new("aggregate", cfg.cache.aggregate_capacity, cfg.cache.aggregate_ttl()),
            settings: Settings::from_config(cfg),
        })
    }
}

/// Generation timestamp stamped on every response envelope.
pub fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Serialise `body`, store it under `key` in the aggregation cache and
/// hand it back.
pub async fn remember<T: Serialize>(
    state: &AppContext,
    key: String,
    body: &T,
) -> Result<axum::Json<Value>, ApiError> {
    let value = serde_json::to_value(body)?;
    state.cache.set(key, value.clone()).await;
    Ok(axum::Json(value))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        // Historical statistics
        .route("/leagues", get(routes::get_leagues))
        .route("/standings/:league", get(routes::get_standings))
        .route("/fixtures/:league", get(routes::get_fixtures))
        .route("/team/:name/stats", get(routes::get_team_stats))
        .route("/team/:name/players", get(routes::get_team_players))
        .route("/player/:name/stats", get(routes::get_player_stats))
        .route("/head-to-head", get(routes::get_head_to_head))
        .route("/top-scorers/:league", get(routes::get_top_scorers))
        // AI assistant
        .route("/ai/chat", post(ai::chat))
        .route("/ai/analyze-match", post(ai::analyze_match))
        .route("/ai/compare-players", post(ai::compare_players))
        .route("/ai/video-script", post(ai::video_script))
        .route("/ai/predict-match", post(ai::predict_match))
        // Live data
        .route("/live/matches", get(live::live_matches))
        .route("/live/today", get(live::today_matches))
        .route("/live/standings/:league", get(live::standings))
        .route("/live/fixtures/:league", get(live::fixtures))
        .route("/live/fixture/:id", get(live::fixture))
        .route("/live/fixture/:id/statistics", get(live::fixture_statistics))
        .route("/live/fixture/:id/lineups", get(live::fixture_lineups))
        .route("/live/fixture/:id/events", get(live::fixture_events))
        .route("/live/team/:name/info", get(live::team_info))
        .route("/live/team/:name/stats", get(live::team_stats))
        .route("/live/team/:name/next", get(live::team_next_match))
        .route("/live/team/:name/last", get(live::team_last_matches))
        .route("/live/player/:id/stats", get(live::player_stats))
        .route("/live/h2h", get(live::head_to_head))
        .route("/live/scorers/:league", get(live::top_scorers))
        .route("/live/assists/:league", get(live::top_assists))
        .route("/live/predictions/:fixture_id", get(live::predictions))
        .route("/search/team", get(live::search_team))
        .route("/search/player", get(live::search_player))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until Ctrl+C.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(%addr, "API server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        })
        .await
        .context("API server error")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
