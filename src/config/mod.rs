//! Configuration management for motivatebot.
//!
//! Settings come from environment variables, optionally seeded from a `.env`
//! file in the working directory. Command-line flags override individual
//! fields after loading.
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY`: API key for the assistant service (required)
//! - `OPENAI_BASE_URL`: Service base URL (defaults to `https://api.openai.com/v1`)
//! - `MOTIVATEBOT_USERS_DIR`: Root of per-user data (defaults to `users`)
//! - `MOTIVATEBOT_TEMPLATE`: Blank profile template (defaults to `<users dir>/blank_profile.json`)
//! - `MOTIVATEBOT_MODEL`: Model for one-shot completions (defaults to `gpt-4o`)
//! - `MOTIVATEBOT_MAIN_ASSISTANT`: Assistant that holds the chat
//! - `MOTIVATEBOT_PROFILE_ASSISTANT`: Assistant that phrases interview questions
//! - `MOTIVATEBOT_POLL_INTERVAL_MS`: Run poll interval (defaults to 100)
//! - `MOTIVATEBOT_RUN_TIMEOUT_SECS`: Run timeout (defaults to 120)
//! - `MOTIVATEBOT_SUMMARIZE`: Summarize sessions on exit (defaults to false)
//! - `MOTIVATEBOT_MODERATION`: Check input for harmful language (defaults to false)

use crate::ai::{CancellationToken, RunPoller};
use crate::constants::{
    BLANK_PROFILE_FILE_NAME, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_MAIN_ASSISTANT_ID,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_PROFILE_ASSISTANT_ID, DEFAULT_RUN_TIMEOUT_SECS,
    DEFAULT_USERS_DIR, ENV_VAR_API_KEY, ENV_VAR_BASE_URL, ENV_VAR_MAIN_ASSISTANT,
    ENV_VAR_MODEL, ENV_VAR_MODERATION, ENV_VAR_POLL_INTERVAL_MS, ENV_VAR_PROFILE_ASSISTANT,
    ENV_VAR_RUN_TIMEOUT_SECS, ENV_VAR_SUMMARIZE, ENV_VAR_TEMPLATE, ENV_VAR_USERS_DIR,
};
use crate::errors::{AppError, AppResult};
use crate::ops::session::ChatSettings;
use crate::store::ProfileStore;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Configuration for the motivatebot application.
///
/// # Examples
///
/// ```
/// use motivatebot::Config;
///
/// let mut config = Config::default();
/// config.api_key = "sk-test".to_string();
/// assert!(config.validate().is_ok());
/// assert!(config.template_path().ends_with("users/blank_profile.json"));
/// ```
#[derive(Clone)]
pub struct Config {
    /// Secret for the assistant service. Never printed.
    pub api_key: String,

    /// Base URL of the assistant service, without a trailing slash.
    pub base_url: String,

    /// Root directory holding one subdirectory per user.
    pub users_dir: PathBuf,

    /// Blank profile template; `None` means `<users_dir>/blank_profile.json`.
    pub template: Option<PathBuf>,

    /// Model used for routing, moderation and summaries.
    pub model: String,

    pub main_assistant_id: String,

    pub profile_assistant_id: String,

    /// Delay between run status checks.
    pub poll_interval: Duration,

    /// Longest wait for a single run.
    pub run_timeout: Duration,

    /// Write a model-generated summary into each session log.
    pub summarize: bool,

    /// Refuse input the moderation check flags as harmful.
    pub moderation: bool,

    /// Interrupts run waits. Every poller from `run_poller` shares it.
    pub interrupt: CancellationToken,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("users_dir", &self.users_dir)
            .field("template", &self.template)
            .field("model", &self.model)
            .field("main_assistant_id", &self.main_assistant_id)
            .field("profile_assistant_id", &self.profile_assistant_id)
            .field("poll_interval", &self.poll_interval)
            .field("run_timeout", &self.run_timeout)
            .field("summarize", &self.summarize)
            .field("moderation", &self.moderation)
            .finish_non_exhaustive()
    }
}

impl Default for Config {
    /// Defaults for everything except the API key, which is left empty.
    fn default() -> Self {
        Config {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            users_dir: PathBuf::from(DEFAULT_USERS_DIR),
            template: None,
            model: DEFAULT_CHAT_MODEL.to_string(),
            main_assistant_id: DEFAULT_MAIN_ASSISTANT_ID.to_string(),
            profile_assistant_id: DEFAULT_PROFILE_ASSISTANT_ID.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            run_timeout: Duration::from_secs(DEFAULT_RUN_TIMEOUT_SECS),
            summarize: false,
            moderation: false,
            interrupt: CancellationToken::new(),
        }
    }
}

impl Config {
    /// Loads configuration from a `.env` file (if any) and the environment.
    ///
    /// Variables already set in the environment win over the `.env` file.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is malformed or a path cannot
    /// be expanded. A missing API key is reported by `validate`.
    ///
    /// ```no_run
    /// use motivatebot::Config;
    ///
    /// match Config::load() {
    ///     Ok(config) => println!("Using model {}", config.model),
    ///     Err(err) => eprintln!("Failed to load config: {}", err),
    /// }
    /// ```
    pub fn load() -> AppResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded settings from {:?}", path),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(AppError::Config(format!("Failed to read .env file: {}", e))),
        }
        Self::from_env()
    }

    /// Loads configuration from the process environment only.
    pub fn from_env() -> AppResult<Self> {
        let defaults = Config::default();

        let users_dir = match env::var(ENV_VAR_USERS_DIR) {
            Ok(raw) => expand_path(&raw)?,
            Err(_) => defaults.users_dir,
        };
        let template = env::var(ENV_VAR_TEMPLATE)
            .ok()
            .map(|raw| expand_path(&raw))
            .transpose()?;

        let poll_interval = match env_u64(ENV_VAR_POLL_INTERVAL_MS)? {
            Some(ms) => Duration::from_millis(ms),
            None => defaults.poll_interval,
        };
        let run_timeout = match env_u64(ENV_VAR_RUN_TIMEOUT_SECS)? {
            Some(secs) => Duration::from_secs(secs),
            None => defaults.run_timeout,
        };

        Ok(Config {
            api_key: env::var(ENV_VAR_API_KEY).unwrap_or_default(),
            base_url: env::var(ENV_VAR_BASE_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            users_dir,
            template,
            model: env::var(ENV_VAR_MODEL).unwrap_or(defaults.model),
            main_assistant_id: env::var(ENV_VAR_MAIN_ASSISTANT)
                .unwrap_or(defaults.main_assistant_id),
            profile_assistant_id: env::var(ENV_VAR_PROFILE_ASSISTANT)
                .unwrap_or(defaults.profile_assistant_id),
            poll_interval,
            run_timeout,
            summarize: env_bool(ENV_VAR_SUMMARIZE)?.unwrap_or(defaults.summarize),
            moderation: env_bool(ENV_VAR_MODERATION)?.unwrap_or(defaults.moderation),
            interrupt: defaults.interrupt,
        })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` naming the first problem found.
    pub fn validate(&self) -> AppResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::Config(format!(
                "{} is not set. Export it or add it to a .env file",
                ENV_VAR_API_KEY
            )));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "{} must start with http:// or https://",
                ENV_VAR_BASE_URL
            )));
        }

        for (value, name) in [
            (&self.model, ENV_VAR_MODEL),
            (&self.main_assistant_id, ENV_VAR_MAIN_ASSISTANT),
            (&self.profile_assistant_id, ENV_VAR_PROFILE_ASSISTANT),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{} cannot be empty", name)));
            }
        }

        if self.users_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Users directory path is empty".to_string()));
        }

        if self.poll_interval.is_zero() {
            return Err(AppError::Config(format!(
                "{} must be greater than zero",
                ENV_VAR_POLL_INTERVAL_MS
            )));
        }

        if self.run_timeout.is_zero() {
            return Err(AppError::Config(format!(
                "{} must be greater than zero",
                ENV_VAR_RUN_TIMEOUT_SECS
            )));
        }

        Ok(())
    }

    /// Path of the blank profile template.
    pub fn template_path(&self) -> PathBuf {
        self.template
            .clone()
            .unwrap_or_else(|| self.users_dir.join(BLANK_PROFILE_FILE_NAME))
    }

    pub fn profile_store(&self) -> ProfileStore {
        ProfileStore::new(&self.users_dir)
    }

    pub fn run_poller(&self) -> RunPoller {
        RunPoller::new(self.poll_interval, self.run_timeout)
            .with_cancellation(self.interrupt.clone())
    }

    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            main_assistant_id: self.main_assistant_id.clone(),
            model: self.model.clone(),
            moderation: self.moderation,
        }
    }
}

/// Expands `~` and environment variables in a path setting.
pub fn expand_path(raw: &str) -> AppResult<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| AppError::Config(format!("Failed to expand path '{}': {}", raw, e)))?;
    Ok(Path::new(expanded.as_ref()).to_path_buf())
}

fn env_u64(name: &str) -> AppResult<Option<u64>> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<u64>().map(Some).map_err(|_| {
            AppError::Config(format!(
                "{} must be a whole number, got '{}'",
                name, raw
            ))
        }),
        Err(_) => Ok(None),
    }
}

fn env_bool(name: &str) -> AppResult<Option<bool>> {
    let raw = match env::var(name) {
        Ok(raw) => raw,
        Err(_) => return Ok(None),
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
        _ => Err(AppError::Config(format!(
            "{} must be true or false, got '{}'",
            name, raw
        ))),
    }
}
