//! FBref historical statistics scraper.
//!
//! Reads league tables, schedules and season stats from FBref competition
//! pages. Every call opens a fresh [`FbrefSession`] scoped to the requested
//! leagues and seasons; nothing is shared between calls. Within a session
//! pages are fetched one at a time with a configurable pause, since FBref
//! blocks clients that hammer it.
//!
//! Site: `https://fbref.com/en/comps/{comp_id}/{season}/...`
//! Auth: none. Rate limit: roughly 10 requests per minute.
//!
//! Secondary tables on FBref pages are shipped inside HTML comments and
//! revealed by JavaScript, so page bodies are uncommented before parsing.
//! Fields are named by the header text FBref shows (`MP`, `Pts`, `Gls`);
//! team, player and fixture columns keep fixed index names.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use super::table::{Cell, Table};
use super::{ProviderError, StatType, StatsProvider};
use crate::config::HistoryConfig;
use crate::types::HistoryLeague;

const PROVIDER: &str = "FBref";

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// Two-digit year to a full year: `51`..`99` are 1900s, the rest 2000s.
fn full_year(yy: u32) -> u32 {
    if yy > 50 {
        1900 + yy
    } else {
        2000 + yy
    }
}

/// Normalise a season id to FBref's `YYYY-YYYY` label.
///
/// Four digits made of consecutive two-digit halves are a multi-year code
/// (`"2425"` and `"2021"` are 2024-25 and 2020-21). Any other four digits
/// are a start year (`"2024"`). Ranges may use `-` or `/` with two- or
/// four-digit parts (`"94-95"`, `"1994-95"`, `"1994/1995"`).
pub fn season_label(season: &str) -> Result<String, ProviderError> {
    let s = season.trim();
    let invalid = || ProviderError::InvalidInput(format!("Invalid season: {season}"));
    let number = |v: &str| -> Option<u32> {
        if v.is_empty() || !v.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        v.parse().ok()
    };
    let label = |start: u32| format!("{start}-{}", start + 1);

    if let Some((first, second)) = s.split_once(['-', '/']) {
        let (Some(a), Some(b)) = (number(first), number(second)) else {
            return Err(invalid());
        };
        let start = match first.len() {
            4 => a,
            2 => full_year(a),
            _ => return Err(invalid()),
        };
        let consecutive = match second.len() {
            4 => b == start + 1,
            2 => b == (start + 1) % 100,
            _ => false,
        };
        return if consecutive { Ok(label(start)) } else { Err(invalid()) };
    }

    let Some(n) = number(s).filter(|_| s.len() == 4) else {
        return Err(invalid());
    };
    let (hi, lo) = (n / 100, n % 100);
    if (hi + 1) % 100 == lo {
        Ok(label(full_year(hi)))
    } else if (1900..2100).contains(&n) {
        Ok(label(n))
    } else {
        Err(invalid())
    }
}

// ---------------------------------------------------------------------------
// Page layout
// ---------------------------------------------------------------------------

/// FBref URL segment and table-id stem for a stat family.
fn stat_page(stat_type: StatType) -> (&'static str, &'static str) {
    match stat_type {
        StatType::Standard => ("stats", "standard"),
        StatType::Keeper => ("keepers", "keeper"),
        StatType::KeeperAdv => ("keepersadv", "keeper_adv"),
        StatType::Shooting => ("shooting", "shooting"),
        StatType::Passing => ("passing", "passing"),
        StatType::PassingTypes => ("passing_types", "passing_types"),
        StatType::GoalShotCreation => ("gca", "gca"),
        StatType::Defense => ("defense", "defense"),
        StatType::Possession => ("possession", "possession"),
        StatType::PlayingTime => ("playingtime", "playing_time"),
        StatType::Misc => ("misc", "misc"),
    }
}

#[derive(Debug, Clone, Copy)]
enum Page {
    LeagueTable,
    Schedule,
    TeamStats(StatType),
    PlayerStats(StatType),
}

impl Page {
    fn url(&self, base: &str, league: &HistoryLeague, season: &str) -> String {
        let base = base.trim_end_matches('/');
        let name = urlencoding::encode(league.page_name);
        let id = league.comp_id;
        match self {
            Page::LeagueTable => format!("{base}/{id}/{season}/{season}-{name}-Stats"),
            Page::Schedule => {
                format!("{base}/{id}/{season}/schedule/{season}-{name}-Scores-and-Fixtures")
            }
            Page::TeamStats(t) | Page::PlayerStats(t) => {
                let (segment, _) = stat_page(*t);
                format!("{base}/{id}/{season}/{segment}/{season}-{name}-Stats")
            }
        }
    }

    /// CSS selector for the wanted table and a name for error messages.
    fn table_selector(&self) -> (String, String) {
        match self {
            Page::LeagueTable => (
                r#"table[id^="results"][id$="_overall"]"#.to_string(),
                "league table".to_string(),
            ),
            Page::Schedule => (r#"table[id^="sched"]"#.to_string(), "schedule".to_string()),
            Page::TeamStats(t) => {
                let id = format!("stats_squads_{}_for", stat_page(*t).1);
                (format!("table#{id}"), id)
            }
            Page::PlayerStats(t) => {
                let id = format!("stats_{}", stat_page(*t).1);
                (format!("table#{id}"), id)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// HTML parsing
// ---------------------------------------------------------------------------

fn selector(css: &str) -> Result<Selector, ProviderError> {
    Selector::parse(css)
        .map_err(|e| ProviderError::InvalidInput(format!("bad selector {css}: {e:?}")))
}

/// `data-stat` keys exposed under fixed names whatever header text the page
/// shows, so rows can be matched by team, player or fixture side.
const INDEX_STATS: &[&str] = &["team", "player", "home_team", "away_team", "score"];

/// A table column: the `data-stat` key cells are matched by, and the field
/// name callers see.
#[derive(Debug, Clone, PartialEq)]
struct Column {
    stat: String,
    name: String,
}

/// Fields are named by header text (`MP`, `Pts`, `Gls`) except for the
/// index stats. Repeated names get a `.1`, `.2` suffix.
fn name_columns(raw: Vec<(String, String)>) -> Vec<Column> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .map(|(stat, label)| {
            let base = if INDEX_STATS.contains(&stat.as_str()) {
                stat.clone()
            } else {
                label
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            Column { stat, name }
        })
        .collect()
}

/// Columns from the last header row, falling back to the first body row
/// (whose `data-stat` keys then double as names).
fn header_columns(table: ElementRef<'_>) -> Result<Vec<Column>, ProviderError> {
    let head_rows = selector("thead tr")?;
    let stat_cells = selector("th[data-stat], td[data-stat]")?;
    let body_rows = selector("tbody tr")?;

    let from_row = |row: ElementRef<'_>, use_text: bool| -> Vec<(String, String)> {
        row.select(&stat_cells)
            .filter_map(|cell| {
                let stat = cell.value().attr("data-stat")?;
                let text = cell.text().collect::<String>().trim().to_string();
                let label = if use_text && !text.is_empty() {
                    text
                } else {
                    stat.to_string()
                };
                Some((stat.to_string(), label))
            })
            .collect()
    };

    let raw = table
        .select(&head_rows)
        .last()
        .map(|row| from_row(row, true))
        .filter(|c| !c.is_empty())
        .or_else(|| table.select(&body_rows).next().map(|row| from_row(row, false)))
        .unwrap_or_default();
    Ok(name_columns(raw))
}

fn is_filler_row(row: &ElementRef<'_>) -> bool {
    row.value()
        .attr("class")
        .map(|class| {
            class
                .split_whitespace()
                .any(|c| matches!(c, "thead" | "over_header" | "spacer" | "partial_table"))
        })
        .unwrap_or(false)
}

/// Parse the first table matching `page` out of an FBref page body.
fn parse_table(html: &str, page: Page, url: &str) -> Result<Table, ProviderError> {
    let uncommented = html.replace("<!--", "").replace("-->", "");
    let document = Html::parse_document(&uncommented);

    let (css, label) = page.table_selector();
    let table_sel = selector(&css)?;
    let Some(element) = document.select(&table_sel).next() else {
        return Err(ProviderError::MissingTable {
            provider: PROVIDER,
            table: label,
            url: url.to_string(),
        });
    };

    let columns = header_columns(element)?;
    // First occurrence of a key wins.
    let by_stat: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .rev()
        .map(|(i, c)| (c.stat.as_str(), i))
        .collect();
    let body_rows = selector("tbody tr")?;
    let stat_cells = selector("th[data-stat], td[data-stat]")?;

    let mut table = Table::new(columns.iter().map(|c| c.name.clone()).collect());
    for row in element.select(&body_rows).filter(|r| !is_filler_row(r)) {
        let mut cells = vec![Cell::Empty; columns.len()];
        let mut any = false;
        for cell in row.select(&stat_cells) {
            let Some(stat) = cell.value().attr("data-stat") else { continue };
            if let Some(&idx) = by_stat.get(stat) {
                let text: String = cell.text().collect();
                cells[idx] = Cell::parse(&text);
                any |= cells[idx] != Cell::Empty;
            }
        }
        if any {
            table.push_row(cells);
        }
    }
    Ok(table)
}

/// Split an FBref score such as `"2–1"` or `"(4) 1–1 (3)"` into home/away goals.
pub fn parse_score(score: &str) -> Option<(i64, i64)> {
    let core: String = score
        .split_whitespace()
        .filter(|part| !part.starts_with('('))
        .collect::<Vec<_>>()
        .join("");
    let (home, away) = core.split_once(['–', '-', '—'])?;
    Some((home.trim().parse().ok()?, away.trim().parse().ok()?))
}

/// Add integer `home_score` / `away_score` columns derived from `score`.
fn add_score_columns(table: &mut Table) {
    if table.has_column("home_score") {
        return;
    }
    let scores: Vec<Option<(i64, i64)>> = (0..table.len())
        .map(|i| table.cell(i, "score").and_then(|c| parse_score(&c.text())))
        .collect();

    let mut rebuilt = Table::new(
        table
            .columns()
            .iter()
            .cloned()
            .chain(["home_score".to_string(), "away_score".to_string()])
            .collect(),
    );
    for (row, score) in table.rows().iter().zip(scores) {
        let mut cells = row.clone();
        match score {
            Some((h, a)) => cells.extend([Cell::Int(h), Cell::Int(a)]),
            None => cells.extend([Cell::Empty, Cell::Empty]),
        }
        rebuilt.push_row(cells);
    }
    *table = rebuilt;
}

// ---------------------------------------------------------------------------
// Scraper
// ---------------------------------------------------------------------------

/// Factory for per-call scraping sessions.
pub struct FbrefScraper {
    base_url: String,
    timeout: Duration,
    request_delay: Duration,
}

impl FbrefScraper {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }

    /// Open a session over `leagues` × `seasons`.
    pub fn session(
        &self,
        leagues: &[HistoryLeague],
        seasons: &[String],
    ) -> Result<FbrefSession, ProviderError> {
        if leagues.is_empty() {
            return Err(ProviderError::InvalidInput("No leagues requested".into()));
        }
        let seasons = seasons
            .iter()
            .map(|s| Ok((s.clone(), season_label(s)?)))
            .collect::<Result<Vec<_>, ProviderError>>()?;

        let http = Client::builder()
            .timeout(self.timeout)
            .user_agent("Mozilla/5.0 (compatible; futbol-ai/0.1)")
            .build()
            .map_err(|e| ProviderError::Transport {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        Ok(FbrefSession {
            http,
            base_url: self.base_url.clone(),
            request_delay: self.request_delay,
            leagues: leagues.to_vec(),
            seasons,
        })
    }
}

/// One scraping session bound to a fixed set of leagues and seasons.
pub struct FbrefSession {
    http: Client,
    base_url: String,
    request_delay: Duration,
    leagues: Vec<HistoryLeague>,
    /// (caller's id, FBref label)
    seasons: Vec<(String, String)>,
}

impl FbrefSession {
    async fn fetch_page(&self, url: &str) -> Result<String, ProviderError> {
        debug!(url, "Fetching FBref page");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }
        resp.text()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, url, e))
    }

    /// Fetch `page` for every league × season and stack the results.
    async fn read(&self, page: Page) -> Result<Table, ProviderError> {
        let mut combined = Table::default();
        let mut first = true;

        for league in &self.leagues {
            for (season_id, label) in &self.seasons {
                if !first && !self.request_delay.is_zero() {
                    tokio::time::sleep(self.request_delay).await;
                }
                first = false;

                let url = page.url(&self.base_url, league, label);
                let html = self.fetch_page(&url).await?;
                let mut table = parse_table(&html, page, &url)?;
                if matches!(page, Page::Schedule) {
                    add_score_columns(&mut table);
                }
                table.insert_constant_column(0, "season", Cell::from(season_id.as_str()));
                table.insert_constant_column(0, "league", Cell::from(league.key));
                combined.append(table);
            }
        }

        info!(
            ?page,
            leagues = self.leagues.len(),
            seasons = self.seasons.len(),
            rows = combined.len(),
            "FBref read complete"
        );
        Ok(combined)
    }
}

#[async_trait]
impl StatsProvider for FbrefScraper {
    async fn read_league_table(
        &self,
        leagues: &[HistoryLeague],
        seasons: &[String],
    ) -> Result<Table, ProviderError> {
        self.session(leagues, seasons)?.read(Page::LeagueTable).await
    }

    async fn read_schedule(
        &self,
        leagues: &[HistoryLeague],
        seasons: &[String],
    ) -> Result<Table, ProviderError> {
        self.session(leagues, seasons)?.read(Page::Schedule).await
    }

    async fn read_team_season_stats(
        &self,
        leagues: &[HistoryLeague],
        seasons: &[String],
        stat_type: StatType,
    ) -> Result<Table, ProviderError> {
        self.session(leagues, seasons)?
            .read(Page::TeamStats(stat_type))
            .await
    }

    async fn read_player_season_stats(
        &self,
        leagues: &[HistoryLeague],
        seasons: &[String],
        stat_type: StatType,
    ) -> Result<Table, ProviderError> {
        self.session(leagues, seasons)?
            .read(Page::PlayerStats(stat_type))
            .await
    }
}
