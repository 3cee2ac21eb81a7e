//! API-Football live data client.
//!
//! Live fixtures, standings, team/player statistics, scorers, lineups,
//! events and predictions for every supported league.
//!
//! API: `https://v3.football.api-sports.io/`
//! Auth: `x-apisports-key` header.
//!
//! One HTTP call per operation, no retries. Successful bodies are kept in
//! the client's own TTL cache, keyed by endpoint plus the full parameter
//! list, so repeated lookups inside the TTL never reach the network.

use chrono::Local;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::ProviderError;
use crate::cache::TtlCache;
use crate::config::LiveDataConfig;

const PROVIDER: &str = "API-Football";

type Params = Vec<(&'static str, String)>;

pub struct LiveDataClient {
    http: Client,
    base_url: String,
    api_key: Option<SecretString>,
    cache: TtlCache<Value>,
}

impl LiveDataClient {
    pub fn new(
        config: &LiveDataConfig,
        api_key: Option<SecretString>,
        cache: TtlCache<Value>,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("futbol-ai/0.1.0")
            .build()
            .map_err(|e| ProviderError::Transport {
                provider: PROVIDER,
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            cache,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn cache_key(endpoint: &str, params: &Params) -> String {
        let query: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect();
        format!("{endpoint}?{}", query.join("&"))
    }

    /// Single GET against `endpoint`. The credential is checked before the
    /// cache or the network are touched.
    async fn request(&self, endpoint: &str, params: Params) -> Result<Value, ProviderError> {
        let Some(key) = &self.api_key else {
            return Err(ProviderError::NotConfigured { provider: PROVIDER });
        };

        let cache_key = Self::cache_key(endpoint, &params);
        if let Some(hit) = self.cache.get(&cache_key).await {
            return Ok(hit);
        }

        let url = format!("{}/{endpoint}", self.base_url);
        debug!(url = %url, key = %cache_key, "API-Football request");

        let resp = self
            .http
            .get(&url)
            .header("x-apisports-key", key.expose_secret())
            .query(&params)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, &url, e))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = %status, endpoint, "API-Football returned an error status");
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, &url, e))?;
        self.cache.set(cache_key, body.clone()).await;
        Ok(body)
    }

    // -- Fixtures ---------------------------------------------------------

    pub async fn live_matches(&self, league_id: Option<u32>) -> Result<Value, ProviderError> {
        let mut params: Params = vec![("live", "all".into())];
        if let Some(id) = league_id {
            params.push(("league", id.to_string()));
        }
        self.request("fixtures", params).await
    }

    pub async fn today_matches(&self, league_id: Option<u32>) -> Result<Value, ProviderError> {
        let mut params: Params = vec![("date", today())];
        if let Some(id) = league_id {
            params.push(("league", id.to_string()));
        }
        self.request("fixtures", params).await
    }

    pub async fn fixtures(
        &self,
        league_id: u32,
        season: u16,
        next: Option<u32>,
        last: Option<u32>,
    ) -> Result<Value, ProviderError> {
        let mut params: Params = vec![("league", league_id.to_string()), ("season", season.to_string())];
        if let Some(n) = next.filter(|n| *n > 0) {
            params.push(("next", n.to_string()));
        }
        if let Some(n) = last.filter(|n| *n > 0) {
            params.push(("last", n.to_string()));
        }
        self.request("fixtures", params).await
    }

    pub async fn fixture_by_id(&self, fixture_id: u64) -> Result<Value, ProviderError> {
        self.request("fixtures", vec![("id", fixture_id.to_string())]).await
    }

    pub async fn team_next_match(&self, team_id: u32) -> Result<Value, ProviderError> {
        self.request("fixtures", vec![("team", team_id.to_string()), ("next", "1".into())])
            .await
    }

    pub async fn team_last_matches(&self, team_id: u32, count: u32) -> Result<Value, ProviderError> {
        self.request("fixtures", vec![("team", team_id.to_string()), ("last", count.to_string())])
            .await
    }

    pub async fn head_to_head(&self, team1_id: u32, team2_id: u32, last: u32) -> Result<Value, ProviderError> {
        self.request(
            "fixtures/headtohead",
            vec![("h2h", format!("{team1_id}-{team2_id}")), ("last", last.to_string())],
        )
        .await
    }

    pub async fn fixture_statistics(&self, fixture_id: u64) -> Result<Value, ProviderError> {
        self.request("fixtures/statistics", vec![("fixture", fixture_id.to_string())])
            .await
    }

    pub async fn fixture_lineups(&self, fixture_id: u64) -> Result<Value, ProviderError> {
        self.request("fixtures/lineups", vec![("fixture", fixture_id.to_string())])
            .await
    }

    pub async fn fixture_events(&self, fixture_id: u64) -> Result<Value, ProviderError> {
        self.request("fixtures/events", vec![("fixture", fixture_id.to_string())])
            .await
    }

    pub async fn predictions(&self, fixture_id: u64) -> Result<Value, ProviderError> {
        self.request("predictions", vec![("fixture", fixture_id.to_string())])
            .await
    }

    // -- Leagues ----------------------------------------------------------

    pub async fn standings(&self, league_id: u32, season: u16) -> Result<Value, ProviderError> {
        self.request("standings", vec![("league", league_id.to_string()), ("season", season.to_string())])
            .await
    }

    pub async fn top_scorers(&self, league_id: u32, season: u16) -> Result<Value, ProviderError> {
        self.request(
            "players/topscorers",
            vec![("league", league_id.to_string()), ("season", season.to_string())],
        )
        .await
    }

    pub async fn top_assists(&self, league_id: u32, season: u16) -> Result<Value, ProviderError> {
        self.request(
            "players/topassists",
            vec![("league", league_id.to_string()), ("season", season.to_string())],
        )
        .await
    }

    // -- Teams and players ------------------------------------------------

    pub async fn team_info(&self, team_id: u32) -> Result<Value, ProviderError> {
        self.request("teams", vec![("id", team_id.to_string())]).await
    }

    pub async fn team_statistics(&self, team_id: u32, league_id: u32, season: u16) -> Result<Value, ProviderError> {
        self.request(
            "teams/statistics",
            vec![
                ("team", team_id.to_string()),
                ("league", league_id.to_string()),
                ("season", season.to_string()),
            ],
        )
        .await
    }

    pub async fn player_statistics(
        &self,
        player_id: Option<u32>,
        team_id: Option<u32>,
        league_id: Option<u32>,
        season: u16,
    ) -> Result<Value, ProviderError> {
        let mut params: Params = vec![("season", season.to_string())];
        if let Some(id) = player_id {
            params.push(("id", id.to_string()));
        }
        if let Some(id) = team_id {
            params.push(("team", id.to_string()));
        }
        if let Some(id) = league_id {
            params.push(("league", id.to_string()));
        }
        self.request("players", params).await
    }

    pub async fn search_team(&self, name: &str) -> Result<Value, ProviderError> {
        self.request("teams", vec![("search", name.to_string())]).await
    }

    pub async fn search_player(&self, name: &str) -> Result<Value, ProviderError> {
        self.request("players", vec![("search", name.to_string())]).await
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// The `response` array of an API-Football body (empty if absent).
pub fn response_items(body: &Value) -> Vec<Value> {
    match body.get("response") {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// The `response` member as-is, for endpoints that return an object.
pub fn response_value(body: &Value) -> Value {
    body.get("response").cloned().unwrap_or(Value::Null)
}

/// The provider-reported `results` count.
pub fn result_count(body: &Value) -> u64 {
    body.get("results").and_then(Value::as_u64).unwrap_or(0)
}

/// Team id of the first search hit.
pub fn first_team_id(search: &Value) -> Option<u32> {
    response_items(search)
        .first()
        .and_then(|hit| hit.pointer("/team/id"))
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
}

/// First standings group of the first league in a standings body.
pub fn first_standings_group(body: &Value) -> Value {
    body.pointer("/response/0/league/standings/0")
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()))
}
