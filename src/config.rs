//! # config — Config from Environment Variables
//!
//! Read once at start-up and passed by reference into each component.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://localhost:5000/v1/api";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How the reporter authenticates against the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerAuth {
    /// Static key sent as `Authorization: Bearer <key>`.
    ApiKey(String),
    /// `POST /sso/login`, then the session cookie is reused.
    Session { username: String, password: String },
}

impl std::fmt::Display for BrokerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrokerAuth::ApiKey(_) => write!(f, "api-key"),
            BrokerAuth::Session { username, .. } => write!(f, "session ({username})"),
        }
    }
}

impl BrokerAuth {
    /// Pick the authentication mode. Exactly one credential set may be present.
    pub fn resolve(
        api_key: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        match (api_key, username, password) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(ConfigError::ConflictingAuth),
            (Some(key), None, None) => Ok(Some(BrokerAuth::ApiKey(key))),
            (None, Some(username), Some(password)) => {
                Ok(Some(BrokerAuth::Session { username, password }))
            }
            (None, Some(_), None) => Err(ConfigError::IncompleteSession("IBKR_PASSWORD")),
            (None, None, Some(_)) => Err(ConfigError::IncompleteSession("IBKR_USERNAME")),
            (None, None, None) => Ok(None),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Gateway root, e.g. `https://localhost:5000/v1/api` (no trailing slash)
    pub base_url:             String,
    /// `None` selects the session-scoped endpoints without an account segment
    pub account_id:           Option<String>,
    pub auth:                 BrokerAuth,
    /// The local Client Portal gateway ships a self-signed certificate
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub webhook_url: String,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id:   String,
    /// Bot API root, overridable for self-hosted Bot API servers
    pub api_base:  String,
}

/// Everything the reporter needs for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` only in demo mode without credentials
    pub broker:          Option<BrokerConfig>,
    pub discord:         Option<DiscordConfig>,
    pub telegram:        Option<TelegramConfig>,
    pub request_timeout: Duration,
    pub demo_mode:       bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let demo_mode = parse_bool("DEMO_MODE", get("DEMO_MODE"))?.unwrap_or(false);

        let auth = BrokerAuth::resolve(
            get("IBKR_API_KEY"),
            get("IBKR_USERNAME"),
            get("IBKR_PASSWORD"),
        )?;

        let broker = match auth {
            Some(auth) => Some(BrokerConfig {
                base_url: get("IBKR_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                account_id: get("IBKR_ACCOUNT_ID"),
                auth,
                accept_invalid_certs: parse_bool(
                    "IBKR_ACCEPT_INVALID_CERTS",
                    get("IBKR_ACCEPT_INVALID_CERTS"),
                )?
                .unwrap_or(false),
            }),
            None if demo_mode => None,
            None => return Err(ConfigError::MissingAuth),
        };

        let timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        key:    "HTTP_TIMEOUT_SECS",
                        value:  raw,
                        reason: "expected a positive number of seconds",
                    })
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let discord = get("DISCORD_WEBHOOK").map(|webhook_url| DiscordConfig { webhook_url });

        // Telegram needs both halves; either one alone disables it.
        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                bot_token,
                chat_id,
                api_base: get("TELEGRAM_API_BASE")
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API.to_string())
                    .trim_end_matches('/')
                    .to_string(),
            }),
            _ => None,
        };

        Ok(Self {
            broker,
            discord,
            telegram,
            request_timeout: Duration::from_secs(timeout_secs),
            demo_mode,
        })
    }
}

fn parse_bool(key: &'static str, raw: Option<String>) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = raw else { return Ok(None) };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "expected true/false",
        }),
    }
}
