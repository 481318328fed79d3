use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use dialoguer::{Password, theme::ColorfulTheme};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::palette::Palette;
use crate::utils::{get_data_dir, strip_controls_and_escapes, trim_line};

pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const AUTH_FILE_NAME: &str = "auth.json";
const DOTENV_FILE_NAME: &str = ".env";
const ANTHROPIC_PROVIDER: &str = "anthropic";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    DotEnv,
    AuthFile,
}

impl ApiKeySource {
    pub fn description(&self) -> &'static str {
        match self {
            ApiKeySource::Environment => "environment variable",
            ApiKeySource::DotEnv => ".env file",
            ApiKeySource::AuthFile => "local auth file",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct AuthFile {
    #[serde(flatten)]
    providers: HashMap<String, ProviderAuth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProviderAuth {
    key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub value: String,
    pub source: ApiKeySource,
}

/// Where each credential source lives. Tests point these at temp files.
#[derive(Debug, Clone)]
struct KeyLocations {
    env_value: Option<String>,
    dotenv_path: PathBuf,
    /// `None` when the data directory is unusable; the other sources still apply.
    auth_path: Option<PathBuf>,
}

impl KeyLocations {
    fn current() -> Self {
        let auth_path = match auth_file_path() {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "auth file unavailable");
                None
            }
        };

        Self {
            env_value: env::var(API_KEY_ENV).ok(),
            dotenv_path: PathBuf::from(DOTENV_FILE_NAME),
            auth_path,
        }
    }
}

pub fn missing_key_message() -> String {
    format!(
        "API key not found. Set {API_KEY_ENV}, add it to a .env file, or run `lesson-summary key --set`."
    )
}

/// Looks the key up and fails with the user-facing message when none is configured.
pub fn require_api_key() -> Result<ApiKey> {
    require_api_key_from(&KeyLocations::current())
}

pub fn find_api_key() -> Result<Option<ApiKey>> {
    lookup_api_key(&KeyLocations::current())
}

fn require_api_key_from(locations: &KeyLocations) -> Result<ApiKey> {
    lookup_api_key(locations)?.ok_or_else(|| anyhow!(missing_key_message()))
}

fn lookup_api_key(locations: &KeyLocations) -> Result<Option<ApiKey>> {
    // 1. Environment variable
    if let Some(value) = locations.env_value.as_deref().and_then(trim_line) {
        return Ok(Some(ApiKey {
            value: value.to_string(),
            source: ApiKeySource::Environment,
        }));
    }

    // 2. .env in the working directory
    if let Some(value) = read_dotenv_key(&locations.dotenv_path)? {
        return Ok(Some(ApiKey {
            value,
            source: ApiKeySource::DotEnv,
        }));
    }

    // 3. Auth file
    let Some(auth_path) = locations.auth_path.as_deref() else {
        return Ok(None);
    };
    let Some(auth) = read_auth_file(auth_path)? else {
        return Ok(None);
    };

    let key = auth
        .providers
        .get(ANTHROPIC_PROVIDER)
        .and_then(|entry| trim_line(&entry.key))
        .map(str::to_string);

    Ok(key.map(|value| ApiKey {
        value,
        source: ApiKeySource::AuthFile,
    }))
}

fn read_dotenv_key(path: &Path) -> Result<Option<String>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read env file at {}", path.display()));
        }
    };
    debug!(path = %path.display(), "read env file");
    Ok(parse_dotenv_value(&contents, API_KEY_ENV))
}

fn parse_dotenv_value(contents: &str, name: &str) -> Option<String> {
    let mut found = None;

    for line in contents.lines() {
        let Some(line) = trim_line(line) else {
            continue;
        };
        if line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() != name {
            continue;
        }

        let value = value.trim();
        let unquoted = ['"', '\'']
            .iter()
            .find_map(|quote| {
                value
                    .strip_prefix(*quote)
                    .and_then(|rest| rest.strip_suffix(*quote))
            })
            .unwrap_or_else(|| {
                // Unquoted values may carry a trailing comment
                value.split(" #").next().unwrap_or(value).trim_end()
            });

        // Later assignments win, as with a shell `source`.
        found = trim_line(unquoted).map(str::to_string);
    }

    found
}

pub fn prompt_for_api_key() -> Result<String> {
    println!(
        "{} (https://console.anthropic.com/settings/keys). It's stored locally for future use.",
        Palette::SUCCESS.paint("Enter your Anthropic API key")
    );
    let raw_password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API Key")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read API key from the terminal")?;

    Ok(strip_controls_and_escapes(&raw_password))
}

pub fn store_api_key(api_key: &str) -> Result<()> {
    store_api_key_at(&auth_file_path()?, api_key)
}

pub fn clear_api_key() -> Result<bool> {
    clear_api_key_at(&auth_file_path()?)
}

fn store_api_key_at(auth_path: &Path, api_key: &str) -> Result<()> {
    let trimmed = trim_line(api_key).with_context(|| "Cannot store an empty API key")?;
    let mut auth = read_auth_file(auth_path)?.unwrap_or_default();

    auth.providers.insert(
        ANTHROPIC_PROVIDER.to_string(),
        ProviderAuth {
            key: trimmed.to_string(),
        },
    );

    write_auth_file(auth_path, &auth)
}

fn clear_api_key_at(auth_path: &Path) -> Result<bool> {
    let Some(mut auth) = read_auth_file(auth_path)? else {
        return Ok(false);
    };

    if auth.providers.remove(ANTHROPIC_PROVIDER).is_none() {
        return Ok(false);
    }

    if auth.providers.is_empty() {
        fs::remove_file(auth_path).with_context(|| {
            format!(
                "Failed to remove empty auth file at {}",
                auth_path.display()
            )
        })?;
        return Ok(true);
    }

    write_auth_file(auth_path, &auth)?;
    Ok(true)
}

fn auth_file_path() -> Result<PathBuf> {
    let data_dir = get_data_dir()?;
    Ok(data_dir.join(AUTH_FILE_NAME))
}

fn read_auth_file(path: &Path) -> Result<Option<AuthFile>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(parse_auth_contents(&contents, path)?)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to read auth file at {}", path.display()))
        }
    }
}

fn write_auth_file(path: &Path, value: &AuthFile) -> Result<()> {
    let contents = format!("{}\n", serde_json::to_string_pretty(value)?);
    fs::write(path, contents)
        .with_context(|| format!("Failed to write auth file at {}", path.display()))?;
    Ok(())
}

fn parse_auth_contents(contents: &str, path: &Path) -> Result<AuthFile> {
    if contents.trim().is_empty() {
        return Ok(AuthFile::default());
    }

    serde_json::from_str(contents)
        .with_context(|| format!("Failed to parse auth file at {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn locations(dir: &TempDir, env_value: Option<&str>) -> KeyLocations {
        KeyLocations {
            env_value: env_value.map(str::to_string),
            dotenv_path: dir.path().join(".env"),
            auth_path: Some(dir.path().join("auth.json")),
        }
    }

    #[test]
    fn nothing_configured_yields_none() {
        let dir = tempdir().unwrap();
        let found = lookup_api_key(&locations(&dir, None)).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn missing_key_fails_with_guidance() {
        let dir = tempdir().unwrap();
        let err = require_api_key_from(&locations(&dir, None)).unwrap_err();
        assert_eq!(err.to_string(), missing_key_message());
        assert!(err.to_string().starts_with("API key not found."));
    }

    #[test]
    fn unusable_data_dir_still_allows_env_and_dotenv() {
        let dir = tempdir().unwrap();
        let mut locations = locations(&dir, Some("env-key"));
        locations.auth_path = None;
        let found = require_api_key_from(&locations).unwrap();
        assert_eq!(found.source, ApiKeySource::Environment);

        locations.env_value = None;
        fs::write(&locations.dotenv_path, "ANTHROPIC_API_KEY=dotenv-key\n").unwrap();
        let found = require_api_key_from(&locations).unwrap();
        assert_eq!(found.value, "dotenv-key");

        fs::remove_file(&locations.dotenv_path).unwrap();
        assert!(require_api_key_from(&locations).is_err());
    }

    #[test]
    fn blank_environment_value_is_skipped() {
        let dir = tempdir().unwrap();
        let found = lookup_api_key(&locations(&dir, Some("   "))).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn environment_wins_over_files() {
        let dir = tempdir().unwrap();
        let locations = locations(&dir, Some("env-key"));
        fs::write(&locations.dotenv_path, "ANTHROPIC_API_KEY=dotenv-key\n").unwrap();
        store_api_key_at(locations.auth_path.as_deref().unwrap(), "auth-key").unwrap();

        let found = lookup_api_key(&locations).unwrap().unwrap();
        assert_eq!(found.value, "env-key");
        assert_eq!(found.source, ApiKeySource::Environment);
    }

    #[test]
    fn dotenv_wins_over_auth_file() {
        let dir = tempdir().unwrap();
        let locations = locations(&dir, None);
        fs::write(&locations.dotenv_path, "ANTHROPIC_API_KEY=\"dotenv-key\"\n").unwrap();
        store_api_key_at(locations.auth_path.as_deref().unwrap(), "auth-key").unwrap();

        let found = lookup_api_key(&locations).unwrap().unwrap();
        assert_eq!(found.value, "dotenv-key");
        assert_eq!(found.source, ApiKeySource::DotEnv);
    }

    #[test]
    fn auth_file_is_the_last_resort() {
        let dir = tempdir().unwrap();
        let locations = locations(&dir, None);
        fs::write(&locations.dotenv_path, "OTHER=1\n").unwrap();
        store_api_key_at(locations.auth_path.as_deref().unwrap(), "auth-key").unwrap();

        let found = lookup_api_key(&locations).unwrap().unwrap();
        assert_eq!(found.value, "auth-key");
        assert_eq!(found.source, ApiKeySource::AuthFile);
    }

    #[test]
    fn parse_dotenv_handles_quotes_comments_and_export() {
        let contents = r#"
# credentials
export ANTHROPIC_API_KEY='single-quoted'
OTHER_KEY=ignored
"#;
        assert_eq!(
            parse_dotenv_value(contents, API_KEY_ENV).as_deref(),
            Some("single-quoted")
        );

        let contents = "ANTHROPIC_API_KEY=plain-value # trailing comment\n";
        assert_eq!(
            parse_dotenv_value(contents, API_KEY_ENV).as_deref(),
            Some("plain-value")
        );

        let contents = "ANTHROPIC_API_KEY=first\nANTHROPIC_API_KEY=second\n";
        assert_eq!(
            parse_dotenv_value(contents, API_KEY_ENV).as_deref(),
            Some("second")
        );

        assert_eq!(parse_dotenv_value("ANTHROPIC_API_KEY=\n", API_KEY_ENV), None);
        assert_eq!(parse_dotenv_value("ANTHROPIC_API_KEY_2=x\n", API_KEY_ENV), None);
    }

    #[test]
    fn parse_auth_contents_handles_empty() {
        let auth = parse_auth_contents("   \n", Path::new("auth.json")).unwrap();
        assert!(auth.providers.is_empty());
    }

    #[test]
    fn malformed_auth_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(&path, "{not json").unwrap();
        assert!(read_auth_file(&path).is_err());
    }

    #[test]
    fn store_overwrites_then_clear_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");

        store_api_key_at(&path, "fake_key").unwrap();
        store_api_key_at(&path, " real_key \n").unwrap();

        let auth = read_auth_file(&path).unwrap().unwrap();
        assert_eq!(
            auth.providers
                .get(ANTHROPIC_PROVIDER)
                .map(|entry| entry.key.as_str()),
            Some("real_key")
        );
        assert!(fs::read_to_string(&path).unwrap().ends_with('\n'));

        assert!(clear_api_key_at(&path).unwrap());
        assert!(!path.exists());
        assert!(!clear_api_key_at(&path).unwrap());
    }

    #[test]
    fn clear_keeps_other_providers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(&path, r#"{"other": {"key": "keep-me"}, "anthropic": {"key": "drop-me"}}"#)
            .unwrap();

        assert!(clear_api_key_at(&path).unwrap());
        let auth = read_auth_file(&path).unwrap().unwrap();
        assert!(auth.providers.contains_key("other"));
        assert!(!auth.providers.contains_key(ANTHROPIC_PROVIDER));
    }

    #[test]
    fn storing_blank_key_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        assert!(store_api_key_at(&path, "  ").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn missing_key_message_names_every_source() {
        let message = missing_key_message();
        assert!(message.starts_with("API key not found."));
        assert!(message.contains(API_KEY_ENV));
        assert!(message.contains(".env"));
    }
}
