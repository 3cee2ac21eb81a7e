//! Historical routes scraping FBref pages served by a mock server.

use axum::http::StatusCode;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use futbol_ai::config::HistoryConfig;
use futbol_ai::data::fbref::FbrefScraper;
use futbol_ai::data::{ProviderError, StatsProvider};
use futbol_ai::types::history_league;

use crate::{app, get, Upstreams};

const STANDINGS_PATH: &str = "/26/2024-2025/2024-2025-Super-Lig-Stats";
const SCHEDULE_PATH: &str = "/26/2024-2025/schedule/2024-2025-Super-Lig-Scores-and-Fixtures";

const STANDINGS_PAGE: &str = r#"<html><body>
<table id="results2024-2025261_overall">
  <thead><tr>
    <th data-stat="rank">Rk</th><th data-stat="team">Squad</th><th data-stat="points">Pts</th>
  </tr></thead>
  <tbody>
    <tr><th data-stat="rank">1</th><td data-stat="team">Galatasaray</td><td data-stat="points">95</td></tr>
    <tr><th data-stat="rank">2</th><td data-stat="team">Fenerbahçe</td><td data-stat="points">84</td></tr>
  </tbody>
</table>
</body></html>"#;

const SCHEDULE_PAGE: &str = r#"<html><body>
<table id="sched_2024-2025_26_1">
  <thead><tr>
    <th data-stat="date">Date</th><th data-stat="home_team">Home</th>
    <th data-stat="score">Score</th><th data-stat="away_team">Away</th>
  </tr></thead>
  <tbody>
    <tr><td data-stat="date">2024-09-21</td><td data-stat="home_team">Fenerbahçe</td>
        <td data-stat="score">1–3</td><td data-stat="away_team">Galatasaray</td></tr>
    <tr class="spacer"><td colspan="4"></td></tr>
    <tr><td data-stat="date">2025-02-24</td><td data-stat="home_team">Galatasaray</td>
        <td data-stat="score">0–0</td><td data-stat="away_team">Fenerbahçe</td></tr>
    <tr><td data-stat="date">2025-03-01</td><td data-stat="home_team">Galatasaray</td>
        <td data-stat="score">2–1</td><td data-stat="away_team">Beşiktaş</td></tr>
  </tbody>
</table>
</body></html>"#;

async fn serve_page(server: &MockServer, page_path: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

#[tokio::test]
async fn scraper_tags_rows_with_league_and_season() {
    let server = MockServer::start().await;
    serve_page(&server, STANDINGS_PATH, STANDINGS_PAGE).await;

    let scraper = FbrefScraper::new(&HistoryConfig {
        base_url: server.uri(),
        request_delay_ms: 0,
        ..HistoryConfig::default()
    });
    let league = history_league("super_lig").unwrap();
    let table = scraper
        .read_league_table(&[league], &["2425".to_string()])
        .await
        .unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(&table.columns()[..5], ["league", "season", "Rk", "team", "Pts"]);
    let records = table.to_records();
    assert_eq!(records[0]["league"], "TUR-Süper Lig");
    assert_eq!(records[0]["season"], "2425");
    assert_eq!(records[1]["Pts"], 84);
    assert_eq!(records[1]["team"], "Fenerbahçe");
}

#[tokio::test]
async fn scraper_reports_missing_table() {
    let server = MockServer::start().await;
    serve_page(&server, STANDINGS_PATH, "<html><body><p>maintenance</p></body></html>").await;

    let scraper = FbrefScraper::new(&HistoryConfig {
        base_url: server.uri(),
        request_delay_ms: 0,
        ..HistoryConfig::default()
    });
    let league = history_league("super_lig").unwrap();
    let err = scraper
        .read_league_table(&[league], &["2425".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::MissingTable { .. }));
}

#[tokio::test]
async fn standings_route_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STANDINGS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(STANDINGS_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(Upstreams { history: Some(server.uri()), ..Default::default() });

    let (status, first) = get(&app, "/standings/super_lig").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["standings"][0]["team"], "Galatasaray");
    assert!(first["updated_at"].is_string());

    let (_, second) = get(&app, "/standings/super_lig").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn head_to_head_from_schedule() {
    let server = MockServer::start().await;
    serve_page(&server, SCHEDULE_PATH, SCHEDULE_PAGE).await;
    let app = app(Upstreams { history: Some(server.uri()), ..Default::default() });

    let (status, body) = get(
        &app,
        "/head-to-head?team1=Galatasaray&team2=Fenerbah%C3%A7e&seasons=2425",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seasons"], serde_json::json!(["2425"]));
    assert_eq!(body["summary"]["total_matches"], 2);
    assert_eq!(body["summary"]["team1_wins"], 1);
    assert_eq!(body["summary"]["draws"], 1);
    assert_eq!(body["matches"][0]["home_score"], 1);
    assert_eq!(body["matches"][0]["away_score"], 3);
}

#[tokio::test]
async fn upstream_page_error_is_500() {
    let server = MockServer::start().await;
    Mock::given(path(SCHEDULE_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    let app = app(Upstreams { history: Some(server.uri()), ..Default::default() });

    let (status, body) = get(&app, "/fixtures/super_lig").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "FBref API error: 429");
}

#[tokio::test]
async fn bad_season_is_400() {
    let app = app(Upstreams::default());
    let (status, body) = get(&app, "/standings/super_lig?season=24-25x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("24-25x"));
}

#[tokio::test]
async fn multi_year_season_code_picks_that_season_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/26/2020-2021/2020-2021-Super-Lig-Stats"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            STANDINGS_PAGE.replace("results2024-2025261_overall", "results2020-2021261_overall"),
        ))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(Upstreams { history: Some(server.uri()), ..Default::default() });

    let (status, body) = get(&app, "/standings/super_lig?season=2021").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["season"], "2021");
    assert_eq!(body["standings"][0]["Pts"], 95);
}
