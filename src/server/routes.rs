//! Historical statistics routes, served from FBref through the
//! aggregation cache.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::error::ApiError;
use super::{now, remember, AppState};
use crate::cache::cache_key;
use crate::data::table::{Record, Table};
use crate::data::StatType;
use crate::head_to_head::{self, H2hSummary};
use crate::types::{default_history_leagues, history_league, HistoryLeague, LEAGUES};

/// Leagues scanned by a player lookup that names no league.
const PLAYER_SEARCH_SPAN: usize = 5;
const DEFAULT_LEAGUE: &str = "super_lig";
const DEFAULT_TOP_SCORERS: usize = 20;

type ApiResult = Result<Json<Value>, ApiError>;

fn require_league(slug: &str) -> Result<HistoryLeague, ApiError> {
    history_league(slug).ok_or_else(|| ApiError::league_not_found(slug))
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SeasonQuery {
    pub season: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub league: Option<String>,
    pub season: Option<String>,
    pub stat_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerQuery {
    pub league: Option<String>,
    pub season: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HeadToHeadQuery {
    pub team1: String,
    pub team2: String,
    pub league: Option<String>,
    /// Comma-separated season codes.
    pub seasons: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopScorersQuery {
    pub season: Option<String>,
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct LeagueInfo {
    id: &'static str,
    name: &'static str,
    country: &'static str,
    live_id: u32,
    historical: bool,
}

#[derive(Debug, Serialize)]
struct StandingsResponse {
    league: String,
    season: String,
    standings: Vec<Record>,
    updated_at: String,
}

#[derive(Debug, Serialize)]
struct FixturesResponse {
    league: String,
    season: String,
    fixtures: Vec<Record>,
    updated_at: String,
}

#[derive(Debug, Serialize)]
struct TeamStatsResponse {
    team: String,
    league: String,
    season: String,
    stat_type: &'static str,
    stats: Vec<Record>,
    updated_at: String,
}

#[derive(Debug, Serialize)]
struct TeamPlayersResponse {
    team: String,
    league: String,
    season: String,
    players: Vec<Record>,
    player_count: usize,
    updated_at: String,
}

#[derive(Debug, Serialize)]
struct PlayerStatsResponse {
    player: String,
    league: Option<String>,
    season: String,
    stats: Vec<Record>,
    updated_at: String,
}

#[derive(Debug, Serialize)]
struct HeadToHeadResponse {
    team1: String,
    team2: String,
    league: String,
    seasons: Vec<String>,
    matches: Vec<Record>,
    summary: H2hSummary,
    updated_at: String,
}

#[derive(Debug, Serialize)]
struct TopScorersResponse {
    league: String,
    season: String,
    top_scorers: Vec<Record>,
    updated_at: String,
}

// ---------------------------------------------------------------------------
// Service routes
// ---------------------------------------------------------------------------

pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "online",
        "message": "Football statistics and AI analysis API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/leagues",
            "/standings/{league}",
            "/fixtures/{league}",
            "/team/{name}/stats",
            "/team/{name}/players",
            "/player/{name}/stats",
            "/head-to-head",
            "/top-scorers/{league}",
            "/ai/chat",
            "/ai/analyze-match",
            "/ai/compare-players",
            "/ai/video-script",
            "/ai/predict-match",
            "/live/matches",
            "/live/today",
            "/live/standings/{league}",
            "/live/fixtures/{league}",
            "/live/h2h",
            "/search/team",
            "/search/player",
            "/health",
        ],
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let configured = |yes: bool| if yes { "configured" } else { "not configured" };
    Json(json!({
        "status": "healthy",
        "timestamp": now(),
        "services": {
            "fbref": "available",
            "api_football": configured(state.live.is_configured()),
            "grok_ai": configured(state.chat.is_configured()),
            "model": state.chat.model_name(),
        },
    }))
}

pub async fn get_leagues() -> Json<Value> {
    let leagues: Vec<LeagueInfo> = LEAGUES
        .iter()
        .map(|l| LeagueInfo {
            id: l.slug,
            name: l.name,
            country: l.country,
            live_id: l.live_id,
            historical: l.history.is_some(),
        })
        .collect();
    Json(json!({ "leagues": leagues }))
}

// ---------------------------------------------------------------------------
// Historical routes
// ---------------------------------------------------------------------------

pub async fn get_standings(
    State(state): State<AppState>,
    Path(league): Path<String>,
    Query(q): Query<SeasonQuery>,
) -> ApiResult {
    let season = q.season.unwrap_or_else(|| state.settings.current_season.clone());
    let key = cache_key("standings", &[&league, &season]);
    if let Some(hit) = state.cache.get(&key).await {
        return Ok(Json(hit));
    }

    let lg = require_league(&league)?;
    let table = state.stats.read_league_table(&[lg], &[season.clone()]).await?;

    let body = StandingsResponse {
        league,
        season,
        standings: table.to_records(),
        updated_at: now(),
    };
    remember(&state, key, &body).await
}

pub async fn get_fixtures(
    State(state): State<AppState>,
    Path(league): Path<String>,
    Query(q): Query<SeasonQuery>,
) -> ApiResult {
    let season = q.season.unwrap_or_else(|| state.settings.current_season.clone());
    let key = cache_key("fixtures", &[&league, &season]);
    if let Some(hit) = state.cache.get(&key).await {
        return Ok(Json(hit));
    }

    let lg = require_league(&league)?;
    let table = state.stats.read_schedule(&[lg], &[season.clone()]).await?;

    let body = FixturesResponse {
        league,
        season,
        fixtures: table.to_records(),
        updated_at: now(),
    };
    remember(&state, key, &body).await
}

pub async fn get_team_stats(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(q): Query<TeamQuery>,
) -> ApiResult {
    let league = q.league.unwrap_or_else(|| DEFAULT_LEAGUE.to_string());
    let season = q.season.unwrap_or_else(|| state.settings.current_season.clone());
    let stat_type = q.stat_type.unwrap_or_else(|| StatType::Standard.as_str().to_string());

    let key = cache_key("team_stats", &[&team, &league, &season, &stat_type]);
    if let Some(hit) = state.cache.get(&key).await {
        return Ok(Json(hit));
    }

    let stat: StatType = stat_type.parse()?;
    let lg = require_league(&league)?;
    let table = state
        .stats
        .read_team_season_stats(&[lg], &[season.clone()], stat)
        .await?;

    let rows = table.filter_contains("team", &team);
    if rows.is_empty() {
        return Err(ApiError::team_not_found(&team));
    }

    let body = TeamStatsResponse {
        team,
        league,
        season,
        stat_type: stat.as_str(),
        stats: rows.to_records(),
        updated_at: now(),
    };
    remember(&state, key, &body).await
}

pub async fn get_team_players(
    State(state): State<AppState>,
    Path(team): Path<String>,
    Query(q): Query<PlayerQuery>,
) -> ApiResult {
    let league = q.league.unwrap_or_else(|| DEFAULT_LEAGUE.to_string());
    let season = q.season.unwrap_or_else(|| state.settings.current_season.clone());

    let key = cache_key("team_players", &[&team, &league, &season]);
    if let Some(hit) = state.cache.get(&key).await {
        return Ok(Json(hit));
    }

    let lg = require_league(&league)?;
    let table = state
        .stats
        .read_player_season_stats(&[lg], &[season.clone()], StatType::Standard)
        .await?;

    let players = table.filter_contains("team", &team);
    debug!(team = %team, players = players.len(), "Squad lookup");

    let body = TeamPlayersResponse {
        team,
        league,
        season,
        player_count: players.len(),
        players: players.to_records(),
        updated_at: now(),
    };
    remember(&state, key, &body).await
}

pub async fn get_player_stats(
    State(state): State<AppState>,
    Path(player): Path<String>,
    Query(q): Query<PlayerQuery>,
) -> ApiResult {
    let season = q.season.unwrap_or_else(|| state.settings.current_season.clone());
    let leagues = match q.league.as_deref() {
        Some(slug) => vec![require_league(slug)?],
        None => default_history_leagues(PLAYER_SEARCH_SPAN),
    };

    let league_keys = leagues.iter().map(|l| l.key).collect::<Vec<_>>().join(",");
    let key = cache_key("player_stats", &[&player, &league_keys, &season]);
    if let Some(hit) = state.cache.get(&key).await {
        return Ok(Json(hit));
    }

    let table = state
        .stats
        .read_player_season_stats(&leagues, &[season.clone()], StatType::Standard)
        .await?;

    let rows = table.filter_contains("player", &player);
    if rows.is_empty() {
        return Err(ApiError::player_not_found(&player));
    }

    let body = PlayerStatsResponse {
        player,
        league: q.league,
        season,
        stats: rows.to_records(),
        updated_at: now(),
    };
    remember(&state, key, &body).await
}

pub async fn get_head_to_head(
    State(state): State<AppState>,
    Query(q): Query<HeadToHeadQuery>,
) -> ApiResult {
    let league = q.league.unwrap_or_else(|| DEFAULT_LEAGUE.to_string());
    let seasons: Vec<String> = match q.seasons.as_deref() {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => state.settings.head_to_head_seasons.clone(),
    };
    if seasons.is_empty() {
        return Err(ApiError::BadRequest("At least one season is required".into()));
    }

    let joined = seasons.join(",");
    let key = cache_key("h2h", &[&q.team1, &q.team2, &league, &joined]);
    if let Some(hit) = state.cache.get(&key).await {
        return Ok(Json(hit));
    }

    let lg = require_league(&league)?;
    let schedule = state.stats.read_schedule(&[lg], &seasons).await?;
    let fixtures = head_to_head::select_fixtures(&schedule, &q.team1, &q.team2);
    let summary = head_to_head::summarize(&fixtures, &q.team1);

    let body = HeadToHeadResponse {
        team1: q.team1,
        team2: q.team2,
        league,
        seasons,
        matches: fixtures.to_records(),
        summary,
        updated_at: now(),
    };
    remember(&state, key, &body).await
}

/// Rank by the first goals column the table carries.
fn top_scorers(table: &Table, limit: usize) -> Result<Table, ApiError> {
    ["Gls", "goals"]
        .into_iter()
        .find_map(|column| table.top_n_by(column, limit))
        .ok_or_else(|| ApiError::Internal("Goals column not found".into()))
}

pub async fn get_top_scorers(
    State(state): State<AppState>,
    Path(league): Path<String>,
    Query(q): Query<TopScorersQuery>,
) -> ApiResult {
    let season = q.season.unwrap_or_else(|| state.settings.current_season.clone());
    let limit = q.limit.unwrap_or(DEFAULT_TOP_SCORERS);

    let key = cache_key("top_scorers", &[&league, &season, &limit.to_string()]);
    if let Some(hit) = state.cache.get(&key).await {
        return Ok(Json(hit));
    }

    let lg = require_league(&league)?;
    let table = state
        .stats
        .read_player_season_stats(&[lg], &[season.clone()], StatType::Standard)
        .await?;
    let ranked = top_scorers(&table, limit)?;

    let body = TopScorersResponse {
        league,
        season,
        top_scorers: ranked.to_records(),
        updated_at: now(),
    };
    remember(&state, key, &body).await
}
