use std::{env, fmt, time::Duration};

use thiserror::Error;

use rusty_menu::MenuOptions;
use rusty_utils::parse::parse_duration_seconds;

pub const TOKEN_VAR: &str = "DISCORD_TOKEN";
pub const TIMEOUT_VAR: &str = "MENU_TIMEOUT";
pub const DELETE_ON_TIMEOUT_VAR: &str = "MENU_DELETE_ON_TIMEOUT";
pub const MENTION_VAR: &str = "MENU_MENTION";
pub const KEEP_REACTIONS_VAR: &str = "MENU_KEEP_REACTIONS_ON_STOP";
pub const LOADING_MESSAGE_VAR: &str = "MENU_LOADING_MESSAGE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`{0}` must be set")]
    Missing(&'static str),
    #[error("`{key}` is not a duration: `{value}` (use e.g. `30s`, `5m`, or `off`)")]
    InvalidDuration { key: &'static str, value: String },
    #[error("`{key}` is not a boolean: `{value}`")]
    InvalidBool { key: &'static str, value: String },
}

/// Startup configuration read from the environment.
#[derive(Clone)]
pub struct BotConfig {
    pub token: String,
    /// Options applied to every menu the bot opens.
    pub menu: MenuOptions,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("menu", &self.menu)
            .finish()
    }
}

impl BotConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through `lookup`. Unset menu variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup(TOKEN_VAR)
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing(TOKEN_VAR))?;

        let mut menu = MenuOptions::default();

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            menu.timeout = parse_timeout(&raw)?;
        }
        if let Some(raw) = lookup(DELETE_ON_TIMEOUT_VAR) {
            menu.delete_on_timeout = parse_bool(DELETE_ON_TIMEOUT_VAR, &raw)?;
        }
        if let Some(raw) = lookup(MENTION_VAR) {
            menu.mention = parse_bool(MENTION_VAR, &raw)?;
        }
        if let Some(raw) = lookup(KEEP_REACTIONS_VAR) {
            menu.keep_user_reaction_on_stop = parse_bool(KEEP_REACTIONS_VAR, &raw)?;
        }
        if let Some(message) = lookup(LOADING_MESSAGE_VAR).filter(|message| !message.trim().is_empty()) {
            menu.loading_message = message;
        }

        Ok(Self { token, menu })
    }
}

fn parse_timeout(raw: &str) -> Result<Option<Duration>, ConfigError> {
    let value = raw.trim();
    if matches!(value.to_ascii_lowercase().as_str(), "0" | "off" | "none") {
        return Ok(None);
    }

    parse_duration_seconds(value)
        .map(|seconds| Some(Duration::from_secs(seconds)))
        .ok_or_else(|| ConfigError::InvalidDuration {
            key: TIMEOUT_VAR,
            value: raw.to_owned(),
        })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: raw.to_owned(),
        }),
    }
}
