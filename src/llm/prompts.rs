//! Prompt templates for the football analyst assistant.

use serde_json::{Map, Value};

pub const SYSTEM_PROMPT: &str = "You are a professional football analyst and assistant. \
Reply in the language the user writes in; default to Turkish.

Your areas of expertise:
- Süper Lig, Champions League and Europa League match analysis
- Player performance evaluation
- Team tactical analysis
- Match predictions and outlooks
- Interpreting statistics (xG, xA, pass completion and so on)
- Writing scripts for YouTube video content

Important rules:
1. Always base your analysis on data and stay objective
2. Cite the statistics behind every prediction
3. Use a warm tone that fits Turkish football culture
4. Stay neutral about big clubs such as Fenerbahçe and Galatasaray
5. When writing video content, use gripping and fluent language

If football data is supplied, analyse and interpret it.";

pub fn match_analysis(home_team: &str, away_team: &str) -> String {
    format!(
        "
Analyse the match {home_team} vs {away_team}.

The analysis should cover:
1. Current form of both teams
2. Strengths and weaknesses
3. Key players
4. Tactical expectations
5. Score prediction and the reasoning behind it
"
    )
}

pub fn player_comparison(player1: &str, player2: &str) -> String {
    format!(
        "
Compare the players {player1} and {player2}.

Comparison criteria:
1. Overall performance
2. Goal and assist contribution
3. Playing style
4. Strengths
5. Which one is more effective, and why?
"
    )
}

pub fn video_script(topic: &str, duration_minutes: u32, style: &str) -> String {
    format!(
        "
Write a {duration_minutes}-minute YouTube video script on the following topic:

Topic: {topic}
Style: {style}

Script format:
1. Attention-grabbing opening (hook)
2. Introduction of the topic
3. Main content (with subheadings)
4. Summary and closing
5. A question for the audience to drive engagement

Tone: energetic, informative, friendly
"
    )
}

pub fn match_prediction(home_team: &str, away_team: &str) -> String {
    format!(
        "
Make a detailed prediction for the match {home_team} vs {away_team}.

The prediction should include:
1. Match result (1X2)
2. Score prediction
3. Half-time / full-time
4. Total goals (over/under)
5. Will both teams score?
6. Confidence level (%)
7. Risk factors
"
    )
}

/// Collect the present entries into a single data object. `None` when
/// nothing was supplied, so no data section is attached at all.
pub fn data_block<const N: usize>(entries: [(&str, Option<Value>); N]) -> Option<Value> {
    let map: Map<String, Value> = entries
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .collect();
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}
