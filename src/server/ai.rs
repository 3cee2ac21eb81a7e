//! AI assistant routes. Uncached; enrichment is best-effort and each
//! response reports whether it made it into the prompt.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ApiError;
use super::{now, AppState};
use crate::enricher;
use crate::types::{ChatMessage, Role};

fn default_true() -> bool {
    true
}

fn default_duration() -> u32 {
    10
}

fn default_style() -> String {
    "analysis".to_string()
}

fn default_league() -> String {
    "super_lig".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
    #[serde(default)]
    pub context: Vec<ContextTurn>,
}

/// A prior turn as the client sent it. The role is checked by the handler
/// so an unknown one is reported as a 400 with a readable detail.
#[derive(Debug, Deserialize)]
pub struct ContextTurn {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl TryFrom<ContextTurn> for ChatMessage {
    type Error = ApiError;

    fn try_from(turn: ContextTurn) -> Result<Self, Self::Error> {
        let role = turn.role.parse::<Role>().map_err(ApiError::BadRequest)?;
        Ok(ChatMessage { role, content: turn.content })
    }
}

#[derive(Debug, Deserialize)]
pub struct MatchBody {
    pub home_team: String,
    pub away_team: String,
    #[serde(default = "default_true")]
    pub include_stats: bool,
}

#[derive(Debug, Deserialize)]
pub struct PlayersBody {
    pub player1: String,
    pub player2: String,
    pub league: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VideoBody {
    pub topic: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default = "default_style")]
    pub style: String,
}

#[derive(Debug, Deserialize)]
pub struct PredictBody {
    pub home_team: String,
    pub away_team: String,
    #[serde(default = "default_league")]
    pub league: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    response: String,
    timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisReply {
    home_team: String,
    away_team: String,
    analysis: String,
    stats_included: bool,
    timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ComparisonReply {
    player1: String,
    player2: String,
    comparison: String,
    stats_included: bool,
    timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ScriptReply {
    topic: String,
    duration: String,
    style: String,
    script: String,
    timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct PredictionReply {
    home_team: String,
    away_team: String,
    prediction: String,
    h2h_included: bool,
    timestamp: String,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, ApiError> {
    let context = body
        .context
        .into_iter()
        .map(ChatMessage::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let response = state.chat.chat(&body.message, &context, None).await;
    Ok(Json(ChatReply { response, timestamp: now() }))
}

pub async fn analyze_match(State(state): State<AppState>, Json(body): Json<MatchBody>) -> Json<AnalysisReply> {
    let team_stats = if body.include_stats {
        enricher::match_team_stats(
            state.stats.as_ref(),
            &state.settings.current_season,
            &body.home_team,
            &body.away_team,
        )
        .await
    } else {
        None
    };
    let stats_included = team_stats.is_some();

    info!(home = %body.home_team, away = %body.away_team, stats_included, "Match analysis requested");
    let analysis = state
        .chat
        .analyze_match(&body.home_team, &body.away_team, team_stats)
        .await;

    Json(AnalysisReply {
        home_team: body.home_team,
        away_team: body.away_team,
        analysis,
        stats_included,
        timestamp: now(),
    })
}

pub async fn compare_players(
    State(state): State<AppState>,
    Json(body): Json<PlayersBody>,
) -> Json<ComparisonReply> {
    let (p1, p2) = enricher::player_pair_stats(
        state.stats.as_ref(),
        body.league.as_deref(),
        &state.settings.current_season,
        &body.player1,
        &body.player2,
    )
    .await;
    let stats_included = p1.is_some() || p2.is_some();

    let comparison = state
        .chat
        .compare_players(&body.player1, &body.player2, p1, p2)
        .await;

    Json(ComparisonReply {
        player1: body.player1,
        player2: body.player2,
        comparison,
        stats_included,
        timestamp: now(),
    })
}

pub async fn video_script(State(state): State<AppState>, Json(body): Json<VideoBody>) -> Json<ScriptReply> {
    let script = state
        .chat
        .generate_video_script(&body.topic, body.duration_minutes, &body.style)
        .await;

    Json(ScriptReply {
        topic: body.topic,
        duration: format!("{} minutes", body.duration_minutes),
        style: body.style,
        script,
        timestamp: now(),
    })
}

pub async fn predict_match(State(state): State<AppState>, Json(body): Json<PredictBody>) -> Json<PredictionReply> {
    let h2h = enricher::head_to_head_fixtures(
        state.stats.as_ref(),
        &body.league,
        &state.settings.head_to_head_seasons,
        &body.home_team,
        &body.away_team,
    )
    .await;
    let h2h_included = h2h.is_some();

    let prediction = state
        .chat
        .predict_match(&body.home_team, &body.away_team, h2h, None)
        .await;

    Json(PredictionReply {
        home_team: body.home_team,
        away_team: body.away_team,
        prediction,
        h2h_included,
        timestamp: now(),
    })
}
