//! Shared reference data and wire types.
//!
//! The league and team tables are static: every supported league slug maps
//! to a live-provider ID, and (for leagues FBref covers) to the historical
//! provider's composite key and page coordinates. Lookups for unknown slugs
//! return `None`; callers decide how to surface that.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Leagues
// ---------------------------------------------------------------------------

/// Coordinates of a league on the historical provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLeague {
    /// Composite `COUNTRY-Name` key, used as the `league` column of every row.
    pub key: &'static str,
    /// FBref competition id.
    pub comp_id: u32,
    /// Name segment FBref uses in page URLs.
    pub page_name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct League {
    pub slug: &'static str,
    pub name: &'static str,
    pub country: &'static str,
    /// API-Football league id.
    pub live_id: u32,
    pub history: Option<HistoryLeague>,
}

const fn hist(key: &'static str, comp_id: u32, page_name: &'static str) -> Option<HistoryLeague> {
    Some(HistoryLeague { key, comp_id, page_name })
}

/// Ordered: the first entries double as the default search set when a
/// player or team lookup does not name a league.
pub const LEAGUES: &[League] = &[
    League { slug: "super_lig", name: "Süper Lig", country: "Türkiye", live_id: 203, history: hist("TUR-Süper Lig", 26, "Super-Lig") },
    League { slug: "premier_league", name: "Premier League", country: "England", live_id: 39, history: hist("ENG-Premier League", 9, "Premier-League") },
    League { slug: "la_liga", name: "La Liga", country: "Spain", live_id: 140, history: hist("ESP-La Liga", 12, "La-Liga") },
    League { slug: "bundesliga", name: "Bundesliga", country: "Germany", live_id: 78, history: hist("GER-Bundesliga", 20, "Bundesliga") },
    League { slug: "serie_a", name: "Serie A", country: "Italy", live_id: 135, history: hist("ITA-Serie A", 11, "Serie-A") },
    League { slug: "ligue_1", name: "Ligue 1", country: "France", live_id: 61, history: hist("FRA-Ligue 1", 13, "Ligue-1") },
    League { slug: "champions_league", name: "Champions League", country: "UEFA", live_id: 2, history: hist("INT-Champions League", 8, "Champions-League") },
    League { slug: "europa_league", name: "Europa League", country: "UEFA", live_id: 3, history: hist("INT-Europa League", 19, "Europa-League") },
    League { slug: "conference_league", name: "Conference League", country: "UEFA", live_id: 848, history: None },
];

/// Historical-provider coordinates for an exact slug.
pub fn history_league(slug: &str) -> Option<HistoryLeague> {
    LEAGUES.iter().find(|l| l.slug == slug).and_then(|l| l.history)
}

/// The first `n` leagues the historical provider covers, in table order.
pub fn default_history_leagues(n: usize) -> Vec<HistoryLeague> {
    LEAGUES.iter().filter_map(|l| l.history).take(n).collect()
}

/// Live-provider id. Accepts display-style input ("Premier League").
pub fn live_league_id(name: &str) -> Option<u32> {
    let slug = name.trim().to_lowercase().replace(' ', "_");
    LEAGUES.iter().find(|l| l.slug == slug).map(|l| l.live_id)
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// Pre-registered live-provider team ids. Anything else goes through the
/// provider's free-text search.
pub const TEAMS: &[(&str, u32)] = &[
    ("fenerbahce", 611),
    ("galatasaray", 645),
    ("besiktas", 549),
    ("trabzonspor", 607),
    ("basaksehir", 567),
    ("antalyaspor", 560),
    ("alanyaspor", 3563),
    ("konyaspor", 3557),
    ("sivasspor", 3574),
    ("kasimpasa", 3561),
    ("kayserispor", 3558),
    ("ankaragucu", 556),
    ("samsunspor", 3570),
    ("rizespor", 3569),
    ("hatayspor", 3581),
    ("gaziantep", 3564),
    ("adana_demirspor", 3573),
    ("pendikspor", 3596),
];

/// Lowercase, underscore-joined, Turkish letters folded to ASCII.
pub fn team_slug(name: &str) -> String {
    name.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            ' ' => '_',
            'ş' => 's',
            'ı' => 'i',
            'ğ' => 'g',
            'ü' => 'u',
            'ö' => 'o',
            'ç' => 'c',
            other => other,
        })
        // "İ".to_lowercase() is "i" followed by a combining dot.
        .filter(|c| *c != '\u{307}')
        .collect()
}

pub fn team_id(name: &str) -> Option<u32> {
    let slug = team_slug(name);
    TEAMS.iter().find(|(s, _)| *s == slug).map(|(_, id)| *id)
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(format!(
                "Unsupported role in context: {s} (expected system, user or assistant)"
            )),
        }
    }
}

/// One role-tagged turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}
