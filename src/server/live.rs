//! Live-data routes backed by API-Football.
//!
//! No aggregation-level caching here: the client keeps its own 15 minute
//! cache, and every envelope gets a fresh `timestamp`.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::error::ApiError;
use super::{now, AppContext, AppState};
use crate::data::api_football::{first_standings_group, first_team_id, response_items, response_value, result_count};
use crate::types::{live_league_id, team_id};

type ApiResult = Result<Json<Value>, ApiError>;

const DEFAULT_LEAGUE: &str = "super_lig";
const DEFAULT_LAST_MATCHES: u32 = 5;
const DEFAULT_H2H_MATCHES: u32 = 10;

fn require_league(name: &str) -> Result<u32, ApiError> {
    live_league_id(name).ok_or_else(|| ApiError::league_not_found(name))
}

/// A supplied-but-unknown league is an error, not a silent "all leagues".
fn optional_league(name: Option<&str>) -> Result<Option<u32>, ApiError> {
    name.map(require_league).transpose()
}

/// Static table first, then the provider's team search.
async fn resolve_team(state: &AppContext, name: &str) -> Result<u32, ApiError> {
    if let Some(id) = team_id(name) {
        return Ok(id);
    }
    match state.live.search_team(name).await {
        Ok(body) => first_team_id(&body).ok_or_else(|| ApiError::team_not_found(name)),
        Err(e) => {
            warn!(team = name, error = %e, "Team search failed");
            Err(ApiError::team_not_found(name))
        }
    }
}

/// `{<field>: [...], count, timestamp}` over the body's `response` array.
fn listing(field: &str, body: &Value) -> Value {
    let items = response_items(body);
    let mut envelope = serde_json::Map::new();
    envelope.insert("count".into(), json!(items.len()));
    envelope.insert(field.into(), Value::Array(items));
    envelope.insert("timestamp".into(), json!(now()));
    Value::Object(envelope)
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LeagueFilter {
    pub league: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeasonQuery {
    pub season: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct FixturesQuery {
    pub season: Option<u16>,
    pub next: Option<u32>,
    pub last: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TeamStatsQuery {
    pub league: Option<String>,
    pub season: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct LastQuery {
    pub count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct HeadToHeadQuery {
    pub team1: String,
    pub team2: String,
    pub last: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn live_matches(State(state): State<AppState>, Query(q): Query<LeagueFilter>) -> ApiResult {
    let league = optional_league(q.league.as_deref())?;
    let body = state.live.live_matches(league).await?;
    Ok(Json(listing("matches", &body)))
}

pub async fn today_matches(State(state): State<AppState>, Query(q): Query<LeagueFilter>) -> ApiResult {
    let league = optional_league(q.league.as_deref())?;
    let body = state.live.today_matches(league).await?;
    let mut envelope = listing("matches", &body);
    envelope["date"] = json!(chrono::Local::now().format("%Y-%m-%d").to_string());
    Ok(Json(envelope))
}

pub async fn fixtures(
    State(state): State<AppState>,
    Path(league): Path<String>,
    Query(q): Query<FixturesQuery>,
) -> ApiResult {
    let id = require_league(&league)?;
    let season = q.season.unwrap_or(state.settings.live_season);
    let body = state.live.fixtures(id, season, q.next, q.last).await?;

    let mut envelope = listing("fixtures", &body);
    envelope["league"] = json!(league);
    envelope["season"] = json!(season);
    Ok(Json(envelope))
}

pub async fn fixture(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult {
    let body = state.live.fixture_by_id(id).await?;
    let fixture = response_items(&body).into_iter().next().unwrap_or(Value::Null);
    Ok(Json(json!({ "fixture_id": id, "fixture": fixture, "timestamp": now() })))
}

pub async fn fixture_statistics(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult {
    let body = state.live.fixture_statistics(id).await?;
    Ok(Json(json!({ "fixture_id": id, "statistics": response_items(&body), "timestamp": now() })))
}

pub async fn fixture_lineups(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult {
    let body = state.live.fixture_lineups(id).await?;
    Ok(Json(json!({ "fixture_id": id, "lineups": response_items(&body), "timestamp": now() })))
}

pub async fn fixture_events(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult {
    let body = state.live.fixture_events(id).await?;
    let events = response_items(&body);
    Ok(Json(json!({ "fixture_id": id, "count": events.len(), "events": events, "timestamp": now() })))
}

pub async fn predictions(State(state): State<AppState>, Path(fixture_id): Path<u64>) -> ApiResult {
    let body = state.live.predictions(fixture_id).await?;
    let prediction = response_items(&body).into_iter().next().unwrap_or(Value::Null);
    Ok(Json(json!({
        "fixture_id": fixture_id,
        "predictions": prediction,
        "timestamp": now(),
    })))
}

pub async fn head_to_head(State(state): State<AppState>, Query(q): Query<HeadToHeadQuery>) -> ApiResult {
    let team1 = resolve_team(&state, &q.team1).await?;
    let team2 = resolve_team(&state, &q.team2).await?;
    let body = state
        .live
        .head_to_head(team1, team2, q.last.unwrap_or(DEFAULT_H2H_MATCHES))
        .await?;

    let mut envelope = listing("matches", &body);
    envelope["team1"] = json!(q.team1);
    envelope["team2"] = json!(q.team2);
    Ok(Json(envelope))
}

// ---------------------------------------------------------------------------
// Leagues
// ---------------------------------------------------------------------------

pub async fn standings(
    State(state): State<AppState>,
    Path(league): Path<String>,
    Query(q): Query<SeasonQuery>,
) -> ApiResult {
    let id = require_league(&league)?;
    let season = q.season.unwrap_or(state.settings.live_season);
    let body = state.live.standings(id, season).await?;
    Ok(Json(json!({
        "league": league,
        "season": season,
        "standings": first_standings_group(&body),
        "timestamp": now(),
    })))
}

pub async fn top_scorers(
    State(state): State<AppState>,
    Path(league): Path<String>,
    Query(q): Query<SeasonQuery>,
) -> ApiResult {
    let id = require_league(&league)?;
    let season = q.season.unwrap_or(state.settings.live_season);
    let body = state.live.top_scorers(id, season).await?;
    Ok(Json(json!({
        "league": league,
        "season": season,
        "top_scorers": response_items(&body),
        "timestamp": now(),
    })))
}

pub async fn top_assists(
    State(state): State<AppState>,
    Path(league): Path<String>,
    Query(q): Query<SeasonQuery>,
) -> ApiResult {
    let id = require_league(&league)?;
    let season = q.season.unwrap_or(state.settings.live_season);
    let body = state.live.top_assists(id, season).await?;
    Ok(Json(json!({
        "league": league,
        "season": season,
        "top_assists": response_items(&body),
        "timestamp": now(),
    })))
}

// ---------------------------------------------------------------------------
// Teams and players
// ---------------------------------------------------------------------------

pub async fn team_info(State(state): State<AppState>, Path(team): Path<String>) -> ApiResult {
    let id = resolve_team(&state, &team).await?;
    let body = state.live.team_info(id).await?;
    let info = response_items(&body).into_iter().next().unwrap_or(Value::Null);
    Ok(Json(json!({ "team": team, "team_id": id, "info": info, "timestamp": now() })))
}

pub async fn team_stats(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(q): Query<TeamStatsQuery>,
) -> ApiResult {
    let league = q.league.unwrap_or_else(|| DEFAULT_LEAGUE.to_string());
    let league_id = require_league(&league)?;
    let id = resolve_team(&state, &team).await?;
    let season = q.season.unwrap_or(state.settings.live_season);

    let body = state.live.team_statistics(id, league_id, season).await?;
    Ok(Json(json!({
        "team": team,
        "league": league,
        "season": season,
        "statistics": response_value(&body),
        "timestamp": now(),
    })))
}

pub async fn team_next_match(State(state): State<AppState>, Path(team): Path<String>) -> ApiResult {
    let id = resolve_team(&state, &team).await?;
    let body = state.live.team_next_match(id).await?;
    let next = response_items(&body).into_iter().next().unwrap_or(Value::Null);
    Ok(Json(json!({ "team": team, "next_match": next, "timestamp": now() })))
}

pub async fn team_last_matches(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(q): Query<LastQuery>,
) -> ApiResult {
    let id = resolve_team(&state, &team).await?;
    let body = state
        .live
        .team_last_matches(id, q.count.unwrap_or(DEFAULT_LAST_MATCHES))
        .await?;

    let mut envelope = listing("matches", &body);
    envelope["team"] = json!(team);
    Ok(Json(envelope))
}

pub async fn player_stats(
    State(state): State<AppState>,
    Path(player_id): Path<u32>,
    Query(q): Query<SeasonQuery>,
) -> ApiResult {
    let season = q.season.unwrap_or(state.settings.live_season);
    let body = state
        .live
        .player_statistics(Some(player_id), None, None, season)
        .await?;
    Ok(Json(json!({
        "player_id": player_id,
        "season": season,
        "stats": response_items(&body),
        "timestamp": now(),
    })))
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

pub async fn search_team(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> ApiResult {
    let body = state.live.search_team(&q.name).await?;
    Ok(Json(search_envelope(q.name, &body)))
}

pub async fn search_player(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> ApiResult {
    let body = state.live.search_player(&q.name).await?;
    Ok(Json(search_envelope(q.name, &body)))
}

fn search_envelope(query: String, body: &Value) -> Value {
    let results = response_items(body);
    json!({
        "query": query,
        "count": results.len(),
        "reported": result_count(body),
        "results": results,
        "timestamp": now(),
    })
}
