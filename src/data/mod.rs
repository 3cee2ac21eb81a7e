//! Upstream data providers.
//!
//! Two external sources feed the API: API-Football for live fixtures,
//! standings and predictions (`api_football`), and FBref league pages for
//! historical tables (`fbref`). Provider failures are returned as
//! [`ProviderError`] values so callers can branch on them without
//! unwinding; the HTTP layer converts them at its boundary.

pub mod api_football;
pub mod fbref;
pub mod table;

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::types::HistoryLeague;
use table::Table;

/// Errors raised by upstream clients.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} API key is not configured")]
    NotConfigured { provider: &'static str },

    #[error("{provider} request timed out: {url}")]
    Timeout { provider: &'static str, url: String },

    #[error("{provider} connection failed: {message}")]
    Transport { provider: &'static str, message: String },

    #[error("{provider} API error: {status}")]
    Status { provider: &'static str, status: u16 },

    #[error("{provider} returned an unreadable response: {message}")]
    Parse { provider: &'static str, message: String },

    #[error("{provider} page has no {table} table: {url}")]
    MissingTable {
        provider: &'static str,
        table: String,
        url: String,
    },

    #[error("{0}")]
    InvalidInput(String),
}

impl ProviderError {
    /// Classify a reqwest failure, keeping timeouts distinct.
    pub fn from_reqwest(provider: &'static str, url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout { provider, url: url.to_string() }
        } else if err.is_decode() {
            ProviderError::Parse { provider, message: err.to_string() }
        } else {
            ProviderError::Transport { provider, message: err.to_string() }
        }
    }
}

/// Season-stat table families published per league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatType {
    Standard,
    Keeper,
    KeeperAdv,
    Shooting,
    Passing,
    PassingTypes,
    GoalShotCreation,
    Defense,
    Possession,
    PlayingTime,
    Misc,
}

impl StatType {
    pub const ALL: &'static [StatType] = &[
        StatType::Standard,
        StatType::Keeper,
        StatType::KeeperAdv,
        StatType::Shooting,
        StatType::Passing,
        StatType::PassingTypes,
        StatType::GoalShotCreation,
        StatType::Defense,
        StatType::Possession,
        StatType::PlayingTime,
        StatType::Misc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatType::Standard => "standard",
            StatType::Keeper => "keeper",
            StatType::KeeperAdv => "keeper_adv",
            StatType::Shooting => "shooting",
            StatType::Passing => "passing",
            StatType::PassingTypes => "passing_types",
            StatType::GoalShotCreation => "goal_shot_creation",
            StatType::Defense => "defense",
            StatType::Possession => "possession",
            StatType::PlayingTime => "playing_time",
            StatType::Misc => "misc",
        }
    }
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        StatType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                let valid: Vec<_> = StatType::ALL.iter().map(|t| t.as_str()).collect();
                ProviderError::InvalidInput(format!(
                    "Invalid stat_type '{s}'. Valid types: {}",
                    valid.join(", ")
                ))
            })
    }
}

/// Historical statistics source.
///
/// Every call covers the cartesian product of `leagues` × `seasons` and
/// returns one table whose leading `league` and `season` columns identify
/// the origin of each row.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn read_league_table(
        &self,
        leagues: &[HistoryLeague],
        seasons: &[String],
    ) -> Result<Table, ProviderError>;

    /// Match schedule with `home_team`, `away_team`, `home_score` and
    /// `away_score` columns.
    async fn read_schedule(
        &self,
        leagues: &[HistoryLeague],
        seasons: &[String],
    ) -> Result<Table, ProviderError>;

    /// Squad-level season stats, one row per team (`team` column).
    async fn read_team_season_stats(
        &self,
        leagues: &[HistoryLeague],
        seasons: &[String],
        stat_type: StatType,
    ) -> Result<Table, ProviderError>;

    /// Player-level season stats (`player` and `team` columns).
    async fn read_player_season_stats(
        &self,
        leagues: &[HistoryLeague],
        seasons: &[String],
        stat_type: StatType,
    ) -> Result<Table, ProviderError>;
}
