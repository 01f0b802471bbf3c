// Static bot configuration, read once at startup.
//
// Values come from environment variables (optionally via a .env file). The
// parsing takes a lookup function instead of reading the environment itself
// so it can be tested with plain maps.

use crate::core::reaction_roles::ReactionRoleBinding;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a numeric id, got `{value}`")]
    InvalidId { key: &'static str, value: String },

    #[error("{key} must be a number, got `{value}`")]
    InvalidNumber { key: &'static str, value: String },

    #[error("Invalid reaction role entry `{0}`, expected `emoji=roleId`")]
    InvalidRoleMapping(String),

    #[error("COMMAND_PREFIX must not be empty")]
    EmptyPrefix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub prefix: String,
    pub welcome_channel_id: Option<u64>,
    pub mod_log_channel_id: Option<u64>,
    pub reaction_roles: ReactionRoleBinding,
    pub daily_reward: u64,
    /// Where the counter documents live.
    pub data_dir: PathBuf,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            welcome_channel_id: None,
            mod_log_channel_id: None,
            reaction_roles: ReactionRoleBinding::default(),
            daily_reward: 100,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl BotConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let prefix = lookup("COMMAND_PREFIX").unwrap_or(defaults.prefix);
        if prefix.trim().is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }

        let daily_reward = match lookup("DAILY_REWARD") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    key: "DAILY_REWARD",
                    value,
                })?,
            None => defaults.daily_reward,
        };

        Ok(Self {
            prefix,
            welcome_channel_id: optional_id(&lookup, "WELCOME_CHANNEL_ID")?,
            mod_log_channel_id: optional_id(&lookup, "MOD_LOG_CHANNEL_ID")?,
            reaction_roles: ReactionRoleBinding {
                message_id: optional_id(&lookup, "REACTION_ROLE_MESSAGE_ID")?,
                roles: parse_role_map(&lookup("REACTION_ROLES").unwrap_or_default())?,
            },
            daily_reward,
            data_dir: lookup("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        })
    }
}

fn optional_id(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<u64>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidId { key, value }),
    }
}

/// Parse `😀=123,🎮=456` into (emoji, role) pairs, keeping their order.
fn parse_role_map(raw: &str) -> Result<Vec<(String, u64)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (emoji, role) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidRoleMapping(entry.to_string()))?;
            let emoji = emoji.trim();
            let role = role
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidRoleMapping(entry.to_string()))?;
            if emoji.is_empty() {
                return Err(ConfigError::InvalidRoleMapping(entry.to_string()));
            }
            Ok((emoji.to_string(), role))
        })
        .collect()
}
