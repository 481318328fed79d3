use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::prompt::{LessonRequest, SYSTEM_PROMPT};

use super::error::{LlmError, parse_http_error};
use super::response::{MessagesRequest, MessagesResponse};
use super::secrets::{ApiKey, ApiKeySource, require_api_key};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Thin client for the Messages endpoint. Cheap to clone.
#[derive(Clone)]
pub struct LessonClient {
    http: reqwest::Client,
    api_key: String,
    settings: Settings,
}

impl std::fmt::Debug for LessonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LessonClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl LessonClient {
    pub fn new(api_key: impl Into<String>, settings: Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn summarize(&self, request: &LessonRequest) -> Result<String, LlmError> {
        info!(
            grade = %request.grade(),
            target_chars = request.learning_targets().chars().count(),
            model = %self.settings.model,
            "requesting lesson summary"
        );

        let user_prompt = request.user_prompt();
        let body = MessagesRequest::single_turn(
            &self.settings.model,
            self.settings.max_tokens,
            SYSTEM_PROMPT,
            &user_prompt,
        );

        let summary = self.send(&body).await?.summary()?;
        info!(summary_chars = summary.chars().count(), "lesson summary received");
        Ok(summary)
    }

    /// Minimal request used to confirm the key is accepted.
    pub async fn healthcheck(&self) -> Result<(), LlmError> {
        let body = MessagesRequest::single_turn(&self.settings.model, 1, SYSTEM_PROMPT, "Hi");
        self.send(&body).await.map(|_| ())
    }

    async fn send(&self, body: &MessagesRequest<'_>) -> Result<MessagesResponse, LlmError> {
        let response = self
            .http
            .post(&self.settings.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .inspect_err(|err| warn!(error = %err, "request to messages endpoint failed"))?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&status) {
            warn!(status, "messages endpoint returned an error");
            return Err(parse_http_error(status, &text));
        }

        let parsed: MessagesResponse = serde_json::from_str(&text)?;
        debug!(
            stop_reason = parsed.stop_reason.as_deref().unwrap_or("unknown"),
            input_tokens = parsed.usage.as_ref().map(|u| u.input_tokens),
            output_tokens = parsed.usage.as_ref().map(|u| u.output_tokens),
            "messages endpoint responded"
        );

        Ok(parsed)
    }
}

/// Builds a client from the configured key, or fails with the missing-key message.
pub fn ensure_client(settings: Settings) -> Result<(LessonClient, ApiKeySource)> {
    let key = require_api_key()?;
    info!(source = key.source.description(), "using configured API key");
    let client = LessonClient::new(key.value, settings)?;
    Ok((client, key.source))
}

pub async fn test_configured_api_key(settings: Settings) -> Result<ApiKeySource> {
    test_api_key(require_api_key()?, settings).await
}

/// Sends a health check with `key` and reports where the key came from.
pub async fn test_api_key(key: ApiKey, settings: Settings) -> Result<ApiKeySource> {
    let client = LessonClient::new(key.value, settings)?;
    client
        .healthcheck()
        .await
        .context("Failed to validate API key with Anthropic")?;
    info!(source = key.source.description(), "API key accepted");
    Ok(key.source)
}
