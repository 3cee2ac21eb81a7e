//! Best-effort context fetches for the AI endpoints.
//!
//! Each function pulls historical data that may help the model and returns
//! `None` on any failure. Failures are logged at `warn` and never reach the
//! caller; the AI request then goes ahead without the extra context.

use serde_json::Value;
use tracing::{debug, warn};

use crate::data::table::Table;
use crate::data::{ProviderError, StatType, StatsProvider};
use crate::head_to_head;
use crate::types::{default_history_leagues, history_league};

/// How many leagues to scan when the request does not name one.
const DEFAULT_LEAGUE_SPAN: usize = 3;

fn records(table: &Table) -> Value {
    Value::Array(table.to_records().into_iter().map(Value::Object).collect())
}

fn swallow<T>(what: &str, result: Result<T, ProviderError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(enrichment = what, error = %e, "Enrichment fetch failed, continuing without it");
            None
        }
    }
}

/// Squad season stats for both sides of a fixture:
/// `{"home": [...], "away": [...]}`. Present even when a side has no rows.
pub async fn match_team_stats(
    stats: &dyn StatsProvider,
    season: &str,
    home_team: &str,
    away_team: &str,
) -> Option<Value> {
    let leagues = default_history_leagues(DEFAULT_LEAGUE_SPAN);
    let table = swallow(
        "team_stats",
        stats
            .read_team_season_stats(&leagues, &[season.to_string()], StatType::Standard)
            .await,
    )?;

    let home = table.filter_contains("team", home_team);
    let away = table.filter_contains("team", away_team);
    debug!(home_rows = home.len(), away_rows = away.len(), "Match stats enrichment");

    Some(serde_json::json!({
        "home": records(&home),
        "away": records(&away),
    }))
}

/// Standard season stats for two players; each side is `None` when the
/// player matched no rows. An unknown `league` falls back to the default
/// league span.
pub async fn player_pair_stats(
    stats: &dyn StatsProvider,
    league: Option<&str>,
    season: &str,
    player1: &str,
    player2: &str,
) -> (Option<Value>, Option<Value>) {
    let leagues = match league.and_then(history_league) {
        Some(lg) => vec![lg],
        None => default_history_leagues(DEFAULT_LEAGUE_SPAN),
    };
    let Some(table) = swallow(
        "player_stats",
        stats
            .read_player_season_stats(&leagues, &[season.to_string()], StatType::Standard)
            .await,
    ) else {
        return (None, None);
    };

    let pick = |name: &str| {
        let rows = table.filter_contains("player", name);
        (!rows.is_empty()).then(|| records(&rows))
    };
    (pick(player1), pick(player2))
}

/// Previous meetings of two teams in `league` over `seasons`; `None` when
/// the league is unknown, the fetch fails or they never met.
pub async fn head_to_head_fixtures(
    stats: &dyn StatsProvider,
    league: &str,
    seasons: &[String],
    home_team: &str,
    away_team: &str,
) -> Option<Value> {
    let Some(lg) = history_league(league) else {
        debug!(league, "No historical coverage for league, skipping head-to-head enrichment");
        return None;
    };
    let schedule = swallow("head_to_head", stats.read_schedule(&[lg], seasons).await)?;
    let fixtures = head_to_head::select_fixtures(&schedule, home_team, away_team);
    (!fixtures.is_empty()).then(|| records(&fixtures))
}
