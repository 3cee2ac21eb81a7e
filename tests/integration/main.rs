//! End-to-end tests against mock upstreams.
//!
//! Every provider (API-Football, FBref, the chat endpoint) is replaced by a
//! `wiremock` server; requests go through the real router.

mod chat;
mod history;
mod live_api;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use futbol_ai::cache::TtlCache;
use futbol_ai::config::{AppConfig, HistoryConfig, LiveDataConfig, LlmConfig};
use futbol_ai::data::api_football::LiveDataClient;
use futbol_ai::data::fbref::FbrefScraper;
use futbol_ai::llm::ChatClient;
use futbol_ai::server::{build_router, AppContext, Settings};

/// Upstream locations for one test. `None` leaves a provider at its
/// defaults with no credential.
#[derive(Default)]
pub struct Upstreams {
    pub live: Option<String>,
    pub history: Option<String>,
    pub chat: Option<String>,
    /// Overrides the live client's request timeout (seconds).
    pub live_timeout_secs: Option<u64>,
}

pub fn test_key() -> Option<SecretString> {
    Some(SecretString::new("test-key".to_string()))
}

pub fn app(upstreams: Upstreams) -> Router {
    let defaults = AppConfig::default();

    let live_cfg = LiveDataConfig {
        base_url: upstreams.live.clone().unwrap_or(defaults.live_data.base_url.clone()),
        timeout_secs: upstreams.live_timeout_secs.unwrap_or(5),
        ..LiveDataConfig::default()
    };
    let history_cfg = HistoryConfig {
        base_url: upstreams.history.clone().unwrap_or(defaults.history.base_url.clone()),
        request_delay_ms: 0,
        timeout_secs: 5,
        ..HistoryConfig::default()
    };
    let chat_cfg = LlmConfig {
        api_url: upstreams
            .chat
            .as_ref()
            .map(|base| format!("{base}/v1/chat/completions"))
            .unwrap_or(defaults.llm.api_url.clone()),
        ..LlmConfig::default()
    };

    let live_key = upstreams.live.as_ref().and_then(|_| test_key());
    let chat_key = upstreams.chat.as_ref().and_then(|_| test_key());

    let ctx = AppContext {
        stats: Arc::new(FbrefScraper::new(&history_cfg)),
        live: LiveDataClient::new(
            &live_cfg,
            live_key,
            TtlCache::new("live", 100, Duration::from_secs(900)),
        )
        .unwrap(),
        chat: ChatClient::new(&chat_cfg, chat_key).unwrap(),
        cache: TtlCache::new("aggregate", 100, Duration::from_secs(3600)),
        settings: Settings::from_config(&defaults),
    };
    build_router(Arc::new(ctx))
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

pub async fn post(app: &Router, uri: &str, json: Value) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}
