//! `/live/*` and `/search/*` against a mocked API-Football.

use axum::http::StatusCode;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use futbol_ai::cache::TtlCache;
use futbol_ai::config::LiveDataConfig;
use futbol_ai::data::api_football::LiveDataClient;
use futbol_ai::data::ProviderError;

use crate::{app, get, test_key, Upstreams};

fn live_client(base_url: String, timeout_secs: u64) -> LiveDataClient {
    LiveDataClient::new(
        &LiveDataConfig { base_url, timeout_secs, ..LiveDataConfig::default() },
        test_key(),
        TtlCache::new("live", 100, Duration::from_secs(900)),
    )
    .unwrap()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

async fn live_app() -> (MockServer, axum::Router) {
    let server = MockServer::start().await;
    let app = app(Upstreams { live: Some(server.uri()), ..Default::default() });
    (server, app)
}

#[tokio::test]
async fn standings_use_first_group_and_client_cache() {
    let (server, app) = live_app().await;

    Mock::given(method("GET"))
        .and(path("/standings"))
        .and(header("x-apisports-key", "test-key"))
        .and(query_param("league", "203"))
        .and(query_param("season", "2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": 1,
            "response": [{
                "league": {
                    "id": 203,
                    "standings": [[
                        {"rank": 1, "team": {"name": "Galatasaray"}, "points": 95},
                        {"rank": 2, "team": {"name": "Fenerbahçe"}, "points": 84}
                    ]]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(&app, "/live/standings/super_lig").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["league"], "super_lig");
    assert_eq!(body["season"], 2024);
    assert_eq!(body["standings"][0]["team"]["name"], "Galatasaray");
    assert!(body["timestamp"].is_string());

    // Served from the client cache within its TTL.
    let (status, _) = get(&app, "/live/standings/super_lig").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn standings_without_groups_is_empty_list() {
    let (server, app) = live_app().await;
    Mock::given(path("/standings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": 0, "response": []})))
        .mount(&server)
        .await;

    let (status, body) = get(&app, "/live/standings/la_liga?season=2023").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["season"], 2023);
    assert_eq!(body["standings"], json!([]));
}

#[tokio::test]
async fn live_matches_filtered_by_league() {
    let (server, app) = live_app().await;
    Mock::given(path("/fixtures"))
        .and(query_param("live", "all"))
        .and(query_param("league", "39"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": 2,
            "response": [{"fixture": {"id": 1}}, {"fixture": {"id": 2}}]
        })))
        .mount(&server)
        .await;

    let (status, body) = get(&app, "/live/matches?league=premier_league").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["matches"][1]["fixture"]["id"], 2);

    let (status, body) = get(&app, "/live/matches?league=mls").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "League not found: mls");
}

#[tokio::test]
async fn unknown_team_search_is_404() {
    let (server, app) = live_app().await;
    Mock::given(path("/teams"))
        .and(query_param("search", "UnknownXYZ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": 0, "response": []})))
        .mount(&server)
        .await;

    let (status, body) = get(&app, "/live/team/UnknownXYZ/stats").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Team not found: UnknownXYZ");
}

#[tokio::test]
async fn team_resolved_through_search() {
    let (server, app) = live_app().await;
    Mock::given(path("/teams"))
        .and(query_param("search", "Ajax"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": 1,
            "response": [{"team": {"id": 194, "name": "Ajax"}}]
        })))
        .mount(&server)
        .await;
    Mock::given(path("/teams/statistics"))
        .and(query_param("team", "194"))
        .and(query_param("league", "203"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": 11,
            "response": {"form": "WWD", "team": {"id": 194}}
        })))
        .mount(&server)
        .await;

    let (status, body) = get(&app, "/live/team/Ajax/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team"], "Ajax");
    assert_eq!(body["statistics"]["form"], "WWD");
}

#[tokio::test]
async fn registered_team_skips_search() {
    let (server, app) = live_app().await;
    Mock::given(path("/teams"))
        .and(query_param("search", "Fenerbahçe"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(path("/fixtures"))
        .and(query_param("team", "611"))
        .and(query_param("next", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": 1,
            "response": [{"fixture": {"id": 99}}]
        })))
        .mount(&server)
        .await;

    let (status, body) = get(&app, "/live/team/Fenerbah%C3%A7e/next").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["next_match"]["fixture"]["id"], 99);
}

#[tokio::test]
async fn head_to_head_uses_resolved_ids() {
    let (server, app) = live_app().await;
    Mock::given(path("/fixtures/headtohead"))
        .and(query_param("h2h", "645-611"))
        .and(query_param("last", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": 1,
            "response": [{"fixture": {"id": 7}}]
        })))
        .mount(&server)
        .await;

    let (status, body) = get(&app, "/live/h2h?team1=Galatasaray&team2=fenerbahce&last=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["team1"], "Galatasaray");
}

#[tokio::test]
async fn upstream_error_status_is_500() {
    let (server, app) = live_app().await;
    Mock::given(path("/players/topscorers"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (status, body) = get(&app, "/live/scorers/serie_a").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "API-Football API error: 500");
}

#[tokio::test]
async fn search_player_envelope() {
    let (server, app) = live_app().await;
    Mock::given(path("/players"))
        .and(query_param("search", "icardi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": 1,
            "response": [{"player": {"id": 2295, "name": "M. Icardi"}}]
        })))
        .mount(&server)
        .await;

    let (status, body) = get(&app, "/search/player?name=icardi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "icardi");
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["player"]["id"], 2295);
}

#[tokio::test]
async fn fixture_events_counted() {
    let (server, app) = live_app().await;
    Mock::given(path("/fixtures/events"))
        .and(query_param("fixture", "1035037"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": 2,
            "response": [{"type": "Goal"}, {"type": "Card"}]
        })))
        .mount(&server)
        .await;

    let (status, body) = get(&app, "/live/fixture/1035037/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fixture_id"], 1035037);
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn scorer_and_assist_listings() {
    let (server, app) = live_app().await;
    Mock::given(path("/players/topscorers"))
        .and(query_param("league", "203"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": 1,
            "response": [{"player": {"name": "V. Osimhen"}, "statistics": [{"goals": {"total": 26}}]}]
        })))
        .mount(&server)
        .await;
    Mock::given(path("/players/topassists"))
        .and(query_param("league", "203"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": 1,
            "response": [{"player": {"name": "D. Tadić"}}]
        })))
        .mount(&server)
        .await;

    let (status, body) = get(&app, "/live/scorers/super_lig").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["top_scorers"][0]["player"]["name"], "V. Osimhen");
    assert!(body.get("scorers").is_none());

    let (status, body) = get(&app, "/live/assists/super_lig?season=2024").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["season"], 2024);
    assert_eq!(body["top_assists"][0]["player"]["name"], "D. Tadić");
}

#[tokio::test]
async fn predictions_are_first_object_or_null() {
    let (server, app) = live_app().await;
    Mock::given(path("/predictions"))
        .and(query_param("fixture", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": 1,
            "response": [{"predictions": {"winner": {"id": 645}}}]
        })))
        .mount(&server)
        .await;
    Mock::given(path("/predictions"))
        .and(query_param("fixture", "11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": 0, "response": []})))
        .mount(&server)
        .await;

    let (status, body) = get(&app, "/live/predictions/10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fixture_id"], 10);
    assert_eq!(body["predictions"]["predictions"]["winner"]["id"], 645);

    let (status, body) = get(&app, "/live/predictions/11").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["predictions"].is_null());
}

#[tokio::test]
async fn slow_provider_is_timeout_error() {
    let server = MockServer::start().await;
    Mock::given(path("/standings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": 0, "response": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = live_client(server.uri(), 1);
    let err = client.standings(203, 2024).await.unwrap_err();
    assert!(matches!(err, ProviderError::Timeout { provider: "API-Football", .. }));
}

#[tokio::test]
async fn slow_provider_route_is_500_timed_out() {
    let server = MockServer::start().await;
    Mock::given(path("/standings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": 0, "response": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    let app = app(Upstreams {
        live: Some(server.uri()),
        live_timeout_secs: Some(1),
        ..Default::default()
    });

    let (status, body) = get(&app, "/live/standings/super_lig").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn client_cache_refetches_after_fifteen_minutes() {
    let server = MockServer::start().await;
    Mock::given(path("/standings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": 0, "response": []})))
        .mount(&server)
        .await;
    let client = live_client(server.uri(), 5);

    client.standings(203, 2024).await.unwrap();
    assert_eq!(request_count(&server).await, 1);

    // Real sockets are involved, so the clock only stands still while it is moved.
    tokio::time::pause();
    tokio::time::advance(Duration::from_secs(899)).await;
    tokio::time::resume();
    client.standings(203, 2024).await.unwrap();
    assert_eq!(request_count(&server).await, 1);

    tokio::time::pause();
    tokio::time::advance(Duration::from_secs(2)).await;
    tokio::time::resume();
    client.standings(203, 2024).await.unwrap();
    assert_eq!(request_count(&server).await, 2);
}
