//! AI routes against a mocked chat-completions endpoint.

use axum::http::StatusCode;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use futbol_ai::config::LlmConfig;
use futbol_ai::llm::{not_configured_message, ChatClient, TIMEOUT_MESSAGE};

use crate::{app, post, test_key, Upstreams};

const COMPLETIONS: &str = "/v1/chat/completions";

fn completion(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "cmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
    }))
}

#[tokio::test]
async fn chat_route_returns_model_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "grok-beta", "max_tokens": 2000})))
        .respond_with(completion("Galatasaray are favourites."))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(Upstreams { chat: Some(server.uri()), ..Default::default() });

    let (status, body) = post(&app, "/ai/chat", json!({"message": "Who wins the derby?"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Galatasaray are favourites.");
}

#[tokio::test]
async fn chat_sends_system_prompt_then_history() {
    let server = MockServer::start().await;
    Mock::given(path(COMPLETIONS))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system"},
                {"role": "user", "content": "earlier question"},
                {"role": "assistant", "content": "earlier answer"},
                {"role": "user", "content": "follow-up"}
            ]
        })))
        .respond_with(completion("ok"))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(Upstreams { chat: Some(server.uri()), ..Default::default() });

    let (status, body) = post(
        &app,
        "/ai/chat",
        json!({
            "message": "follow-up",
            "context": [
                {"role": "user", "content": "earlier question"},
                {"role": "assistant", "content": "earlier answer"}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "ok");
}

#[tokio::test]
async fn missing_key_never_calls_provider() {
    let app = app(Upstreams::default());
    let (status, body) = post(
        &app,
        "/ai/video-script",
        json!({"topic": "Derby week", "duration_minutes": 5, "style": "energetic"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["script"], not_configured_message("GROK_API_KEY"));
    assert_eq!(body["duration"], "5 minutes");
    assert_eq!(body["style"], "energetic");
}

#[tokio::test]
async fn provider_error_status_becomes_text() {
    let server = MockServer::start().await;
    Mock::given(path(COMPLETIONS))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = ChatClient::new(
        &LlmConfig { api_url: format!("{}{COMPLETIONS}", server.uri()), ..LlmConfig::default() },
        test_key(),
    )
    .unwrap();
    assert_eq!(client.chat("hi", &[], None).await, "API error: 429 - rate limited");
}

#[tokio::test]
async fn provider_timeout_becomes_fixed_message() {
    let server = MockServer::start().await;
    Mock::given(path(COMPLETIONS))
        .respond_with(completion("late").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let client = ChatClient::new(
        &LlmConfig {
            api_url: format!("{}{COMPLETIONS}", server.uri()),
            timeout_secs: 1,
            ..LlmConfig::default()
        },
        test_key(),
    )
    .unwrap();
    assert_eq!(client.chat("hi", &[], None).await, TIMEOUT_MESSAGE);
}

#[tokio::test]
async fn prediction_without_history_still_answers() {
    let server = MockServer::start().await;
    Mock::given(path(COMPLETIONS))
        .respond_with(completion("2-1"))
        .mount(&server)
        .await;
    // No FBref upstream reachable for an unknown league: enrichment is skipped.
    let app = app(Upstreams { chat: Some(server.uri()), ..Default::default() });

    let (status, body) = post(
        &app,
        "/ai/predict-match",
        json!({"home_team": "Ajax", "away_team": "PSV", "league": "eredivisie"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "2-1");
    assert_eq!(body["h2h_included"], false);
}
