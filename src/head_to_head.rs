//! Head-to-head selection and win/draw attribution over a match schedule.
//!
//! Team names are matched by case-insensitive substring, so "Galata"
//! selects Galatasaray fixtures. A fixture counts as a win for whichever
//! queried team the home-team column names when the home side scored
//! more, and for the other team otherwise; level scores are draws. Every
//! selected fixture lands in exactly one bucket.

use serde::Serialize;

use crate::data::table::{contains_ignore_case, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct H2hSummary {
    pub total_matches: usize,
    pub team1_wins: usize,
    pub team2_wins: usize,
    pub draws: usize,
}

/// Fixtures where one team is at home and the other away, in either order.
pub fn select_fixtures(schedule: &Table, team1: &str, team2: &str) -> Table {
    let (Some(home), Some(away)) = (
        schedule.column_index("home_team"),
        schedule.column_index("away_team"),
    ) else {
        return Table::new(schedule.columns().to_vec());
    };

    schedule.filter_rows(|t, i| {
        let row = &t.rows()[i];
        let home_name = row[home].text();
        let away_name = row[away].text();
        (contains_ignore_case(&home_name, team1) && contains_ignore_case(&away_name, team2))
            || (contains_ignore_case(&home_name, team2) && contains_ignore_case(&away_name, team1))
    })
}

/// Tally results of `fixtures` from `team1`'s point of view. Missing
/// scores count as zero.
pub fn summarize(fixtures: &Table, team1: &str) -> H2hSummary {
    let mut summary = H2hSummary {
        total_matches: fixtures.len(),
        ..H2hSummary::default()
    };

    for i in 0..fixtures.len() {
        let score = |col: &str| {
            fixtures
                .cell(i, col)
                .and_then(|c| c.as_f64())
                .unwrap_or(0.0)
        };
        let home_score = score("home_score");
        let away_score = score("away_score");
        let team1_home = fixtures
            .cell(i, "home_team")
            .map(|c| contains_ignore_case(&c.text(), team1))
            .unwrap_or(false);

        if home_score > away_score {
            if team1_home {
                summary.team1_wins += 1;
            } else {
                summary.team2_wins += 1;
            }
        } else if away_score > home_score {
            if team1_home {
                summary.team2_wins += 1;
            } else {
                summary.team1_wins += 1;
            }
        } else {
            summary.draws += 1;
        }
    }

    summary
}
