//! Chat-completion client for the football assistant.
//!
//! Talks to xAI Grok through its OpenAI-compatible Chat Completions API.
//! Every conversation starts with the fixed analyst instruction from
//! [`prompts::SYSTEM_PROMPT`]. Failures never escape this module: the
//! caller always gets a string it can show to the user.

pub mod prompts;

use anyhow::Context;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::types::ChatMessage;

/// Reply used when no credential is configured; no request is made.
/// `env` is the variable the key is read from (`llm.api_key_env`).
pub fn not_configured_message(env: &str) -> String {
    format!("API key is not configured. Please set the {env} environment variable.")
}

/// Returned when the provider does not answer within the timeout.
pub const TIMEOUT_MESSAGE: &str = "The request timed out. Please try again.";

/// Separates the user's instruction from attached evidence.
pub const DATA_SEPARATOR: &str = "\n\n--- RELEVANT DATA ---\n";

// ---------------------------------------------------------------------------
// API types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct ChatClient {
    http: Client,
    api_url: String,
    api_key: Option<SecretString>,
    api_key_env: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatClient {
    pub fn new(config: &LlmConfig, api_key: Option<SecretString>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build chat HTTP client")?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Full message list: system instruction, prior turns, then the user
    /// turn with `data` appended after [`DATA_SEPARATOR`].
    pub fn build_messages(
        message: &str,
        context: &[ChatMessage],
        data: Option<&Value>,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(context.len() + 2);
        messages.push(ChatMessage::system(prompts::SYSTEM_PROMPT));
        messages.extend_from_slice(context);

        let mut user = message.to_string();
        if let Some(data) = data {
            // serde_json writes non-ASCII characters verbatim.
            let rendered = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
            user.push_str(DATA_SEPARATOR);
            user.push_str(&rendered);
        }
        messages.push(ChatMessage::user(user));
        messages
    }

    /// Send one conversation turn and return the reply text.
    pub async fn chat(&self, message: &str, context: &[ChatMessage], data: Option<&Value>) -> String {
        let Some(key) = &self.api_key else {
            return not_configured_message(&self.api_key_env);
        };

        let messages = Self::build_messages(message, context, data);
        let request = ChatRequest {
            model: &self.model,
            messages: &messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, turns = messages.len(), "Chat completion request");

        let resp = match self
            .http
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", key.expose_secret()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                warn!(model = %self.model, "Chat completion timed out");
                return TIMEOUT_MESSAGE.to_string();
            }
            Err(e) => return format!("An error occurred: {e}"),
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, "Chat completion returned an error status");
            return format!("API error: {} - {body}", status.as_u16());
        }

        match resp.json::<ChatResponse>().await {
            Ok(body) => match body.choices.into_iter().next().and_then(|c| c.message) {
                Some(m) => m.content,
                None => "An error occurred: response contained no choices".to_string(),
            },
            Err(e) if e.is_timeout() => TIMEOUT_MESSAGE.to_string(),
            Err(e) => format!("An error occurred: {e}"),
        }
    }

    pub async fn analyze_match(&self, home_team: &str, away_team: &str, team_stats: Option<Value>) -> String {
        let prompt = prompts::match_analysis(home_team, away_team);
        let data = prompts::data_block([("team_stats", team_stats)]);
        self.chat(&prompt, &[], data.as_ref()).await
    }

    pub async fn compare_players(
        &self,
        player1: &str,
        player2: &str,
        player1_stats: Option<Value>,
        player2_stats: Option<Value>,
    ) -> String {
        let prompt = prompts::player_comparison(player1, player2);
        let data = prompts::data_block([("player1_stats", player1_stats), ("player2_stats", player2_stats)]);
        self.chat(&prompt, &[], data.as_ref()).await
    }

    pub async fn generate_video_script(&self, topic: &str, duration_minutes: u32, style: &str) -> String {
        let prompt = prompts::video_script(topic, duration_minutes, style);
        self.chat(&prompt, &[], None).await
    }

    pub async fn predict_match(
        &self,
        home_team: &str,
        away_team: &str,
        h2h_data: Option<Value>,
        form_data: Option<Value>,
    ) -> String {
        let prompt = prompts::match_prediction(home_team, away_team);
        let data = prompts::data_block([("head_to_head", h2h_data), ("form", form_data)]);
        self.chat(&prompt, &[], data.as_ref()).await
    }
}
