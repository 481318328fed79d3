use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub const MODEL_ENV: &str = "LESSON_SUMMARY_MODEL";
pub const MAX_TOKENS_ENV: &str = "LESSON_SUMMARY_MAX_TOKENS";
pub const API_URL_ENV: &str = "LESSON_SUMMARY_API_URL";

/// Everything the client needs besides the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub model: String,
    pub max_tokens: u32,
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Values passed on the command line. They win over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

impl Settings {
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let settings = Self::from_lookup(|name| env::var(name).ok())?;
        settings.with_overrides(overrides)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(model) = read(MODEL_ENV) {
            settings.model = model;
        }

        if let Some(raw) = read(MAX_TOKENS_ENV) {
            let max_tokens = raw
                .parse::<u32>()
                .with_context(|| format!("{MAX_TOKENS_ENV} must be a positive integer, got '{raw}'"))?;
            settings.max_tokens = max_tokens;
        }

        if let Some(url) = read(API_URL_ENV) {
            settings.api_url = url;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn with_overrides(mut self, overrides: &Overrides) -> Result<Self> {
        if let Some(model) = overrides.model.as_deref().map(str::trim)
            && !model.is_empty()
        {
            self.model = model.to_string();
        }
        if let Some(max_tokens) = overrides.max_tokens {
            self.max_tokens = max_tokens;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            bail!("max tokens must be greater than zero");
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            bail!("API URL must start with http:// or https://, got '{}'", self.api_url);
        }
        Ok(())
    }
}
