//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use time::UtcOffset;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LEAGUE_BACK_CONFIG_PATH";

const DEFAULT_AUTH_COOKIE: &str = "token";
const DEFAULT_LEADERBOARD_LIMIT: i64 = 50;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Offset of the league wall clock from UTC.
    pub utc_offset: UtcOffset,
    /// Name of the cookie carrying the session token.
    pub auth_cookie: String,
    /// Upper bound for leaderboard page sizes.
    pub leaderboard_limit: i64,
    /// Deadline applied to store transactions issued by request handlers.
    pub store_timeout: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        utc_offset = %app_config.utc_offset,
                        "loaded league configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; absent keys keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        let raw: RawConfig = serde_json::from_str(contents)?;
        Ok(raw.into())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    utc_offset_minutes: i32,
    auth_cookie: String,
    leaderboard_limit: i64,
    store_timeout_ms: u64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            auth_cookie: DEFAULT_AUTH_COOKIE.into(),
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let utc_offset = UtcOffset::from_whole_seconds(value.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|_| {
                warn!(
                    minutes = value.utc_offset_minutes,
                    "utcOffsetMinutes out of range; using UTC"
                );
                UtcOffset::UTC
            });
        let auth_cookie = if value.auth_cookie.trim().is_empty() {
            DEFAULT_AUTH_COOKIE.into()
        } else {
            value.auth_cookie
        };

        Self {
            utc_offset,
            auth_cookie,
            leaderboard_limit: value.leaderboard_limit.max(1),
            store_timeout: Duration::from_millis(value.store_timeout_ms.max(1)),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.utc_offset, UtcOffset::UTC);
        assert_eq!(config.auth_cookie, "token");
        assert_eq!(config.leaderboard_limit, 50);
        assert_eq!(config.store_timeout, Duration::from_secs(5));
    }

    #[test]
    fn camel_case_keys_override_defaults() {
        let config = AppConfig::from_json(
            r#"{"utcOffsetMinutes": 120, "authCookie": "league", "leaderboardLimit": 10, "storeTimeoutMs": 250}"#,
        )
        .unwrap();
        assert_eq!(config.utc_offset.whole_minutes(), 120);
        assert_eq!(config.auth_cookie, "league");
        assert_eq!(config.leaderboard_limit, 10);
        assert_eq!(config.store_timeout, Duration::from_millis(250));
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let config = AppConfig::from_json(r#"{"utcOffsetMinutes": 100000}"#).unwrap();
        assert_eq!(config.utc_offset, UtcOffset::UTC);
    }
}
