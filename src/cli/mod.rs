//! Command-line interface for motivatebot.

use crate::config::{expand_path, Config};
use crate::constants::{
    APP_DESCRIPTION, APP_NAME, DEFAULT_LOG_LEVEL, LOG_FORMAT_JSON, LOG_FORMAT_TEXT,
};
use crate::errors::AppResult;
use clap::Parser;

/// A conversational motivation coach for the terminal
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION, author, version, long_about = None)]
pub struct CliArgs {
    /// User name; prompted for when omitted
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Root directory for user profiles and session logs
    #[arg(long, value_name = "DIR")]
    pub users_dir: Option<String>,

    /// Blank profile template used to interview new users
    #[arg(long, value_name = "PATH")]
    pub template: Option<String>,

    /// Add a model-written summary to the session log
    #[arg(long)]
    pub summarize: bool,

    /// Refuse messages that contain harmful language
    #[arg(long)]
    pub moderate: bool,

    /// Log output format
    #[arg(long, value_name = "FORMAT", default_value = LOG_FORMAT_TEXT,
          value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON])]
    pub log_format: String,

    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Print debug logs
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse() -> Self {
        <CliArgs as Parser>::parse()
    }

    /// Filter directive used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }

    pub fn json_logs(&self) -> bool {
        self.log_format == LOG_FORMAT_JSON
    }

    /// Applies flag overrides on top of loaded configuration.
    ///
    /// Boolean flags only switch features on; they never turn off a feature
    /// enabled through the environment.
    pub fn apply_to(&self, config: &mut Config) -> AppResult<()> {
        if let Some(dir) = &self.users_dir {
            config.users_dir = expand_path(dir)?;
        }
        if let Some(template) = &self.template {
            config.template = Some(expand_path(template)?);
        }
        config.summarize |= self.summarize;
        config.moderation |= self.moderate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(vec!["motivatebot"]);
        assert!(args.user.is_none());
        assert!(args.users_dir.is_none());
        assert!(!args.summarize);
        assert!(!args.moderate);
        assert!(!args.verbose);
        assert!(!args.json_logs());
        assert_eq!(args.log_filter(), DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_user_flag() {
        let args = CliArgs::parse_from(vec!["motivatebot", "--user", "alice"]);
        assert_eq!(args.user.as_deref(), Some("alice"));

        let args = CliArgs::parse_from(vec!["motivatebot", "-u", "bob"]);
        assert_eq!(args.user.as_deref(), Some("bob"));
    }

    #[test]
    fn test_verbose_overrides_log_level() {
        let args = CliArgs::parse_from(vec!["motivatebot", "--log-level", "warn"]);
        assert_eq!(args.log_filter(), "warn");

        let args = CliArgs::parse_from(vec!["motivatebot", "--log-level", "warn", "-v"]);
        assert_eq!(args.log_filter(), "debug");
    }

    #[test]
    fn test_log_format() {
        let args = CliArgs::parse_from(vec!["motivatebot", "--log-format", "json"]);
        assert!(args.json_logs());

        let result = CliArgs::try_parse_from(vec!["motivatebot", "--log-format", "xml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_to_config() {
        let args = CliArgs::parse_from(vec![
            "motivatebot",
            "--users-dir",
            "/srv/users",
            "--template",
            "/srv/blank.json",
            "--summarize",
            "--moderate",
        ]);
        let mut config = Config::default();

        args.apply_to(&mut config).unwrap();

        assert_eq!(config.users_dir, PathBuf::from("/srv/users"));
        assert_eq!(config.template_path(), PathBuf::from("/srv/blank.json"));
        assert!(config.summarize);
        assert!(config.moderation);
    }

    #[test]
    fn test_apply_to_keeps_environment_settings() {
        let args = CliArgs::parse_from(vec!["motivatebot"]);
        let mut config = Config {
            summarize: true,
            users_dir: PathBuf::from("/from/env"),
            ..Config::default()
        };

        args.apply_to(&mut config).unwrap();

        assert!(config.summarize);
        assert_eq!(config.users_dir, PathBuf::from("/from/env"));
    }
}
