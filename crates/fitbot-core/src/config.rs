use std::{env, path::PathBuf, time::Duration};

use crate::{domain::ChatId, errors::Error, lead::DeliveryConfig, Result};

pub const DEFAULT_COMMANDS_API_BASE_URL: &str = "https://api.pf-forum.ru/api/v2/";
pub const DEFAULT_COMMANDS_API_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_WORKOUT_LOG_PATH: &str = "workouts.jsonl";

/// Deployment flavour selected by `NODE_ENV` (or its alias `APP_ENV`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Docker,
    Production,
}

impl RunMode {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "development" => Ok(RunMode::Development),
            "docker" => Ok(RunMode::Docker),
            "production" => Ok(RunMode::Production),
            other => Err(Error::Config(format!(
                "NODE_ENV must be one of development, docker, production (got {other:?})"
            ))),
        }
    }

    pub fn env_file(self) -> &'static str {
        match self {
            RunMode::Development => ".env.dev",
            RunMode::Docker => ".env.docker",
            RunMode::Production => ".env.prod",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Development => "development",
            RunMode::Docker => "docker",
            RunMode::Production => "production",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub run_mode: RunMode,
    pub manager_chat_id: Option<ChatId>,
    pub commands_api_base_url: String,
    pub commands_api_timeout: Duration,
    pub workout_log_path: PathBuf,
}

impl Config {
    /// Loads `.env` (expected to hold only `NODE_ENV`), then the per-mode env
    /// file, then reads the process environment. Variables already set are
    /// never overridden.
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let run_mode = run_mode_from_lookup(env_str)?;

        let file = run_mode.env_file();
        dotenv::from_filename(file)
            .map_err(|e| Error::Config(format!("failed to load {file}: {e}")))?;

        Self::from_lookup(run_mode, env_str)
    }

    /// Builds the config from any key lookup; `load` passes the process env.
    pub fn from_lookup<F>(run_mode: RunMode, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("BOT_TOKEN")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("BOT_TOKEN environment variable is required".to_string())
            })?;

        let manager_chat_id = parse_manager_chat_id(lookup("MANAGER_CHAT_ID"));

        let commands_api_base_url = lookup("COMMANDS_API_BASE_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_COMMANDS_API_BASE_URL.to_string());
        let commands_api_timeout = Duration::from_millis(
            lookup("COMMANDS_API_TIMEOUT_MS")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_COMMANDS_API_TIMEOUT_MS),
        );
        let workout_log_path = PathBuf::from(
            lookup("WORKOUT_LOG_PATH")
                .and_then(non_empty)
                .unwrap_or_else(|| DEFAULT_WORKOUT_LOG_PATH.to_string()),
        );

        Ok(Self {
            bot_token,
            run_mode,
            manager_chat_id,
            commands_api_base_url,
            commands_api_timeout,
            workout_log_path,
        })
    }

    /// Where finished leads go. Delivery errors are shown to the user only
    /// in development.
    pub fn delivery_config(&self) -> DeliveryConfig {
        DeliveryConfig {
            manager_chat_id: self.manager_chat_id,
            surface_delivery_errors: self.run_mode == RunMode::Development,
        }
    }

    /// First 8 characters of the token, safe to log.
    pub fn token_prefix(&self) -> String {
        self.bot_token.chars().take(8).collect()
    }
}

/// `NODE_ENV` wins; `APP_ENV` is accepted when it is unset.
pub fn run_mode_from_lookup<F>(lookup: F) -> Result<RunMode>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup("NODE_ENV")
        .and_then(non_empty)
        .or_else(|| lookup("APP_ENV").and_then(non_empty))
        .ok_or_else(|| Error::Config("NODE_ENV environment variable is required".to_string()))?;
    RunMode::parse(&raw)
}

fn parse_manager_chat_id(raw: Option<String>) -> Option<ChatId> {
    let raw = raw.and_then(non_empty)?;
    match raw.trim().parse::<i64>() {
        Ok(id) => Some(ChatId(id)),
        Err(_) => {
            tracing::warn!(
                value = %raw,
                "MANAGER_CHAT_ID is not an integer; lead delivery disabled"
            );
            None
        }
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
