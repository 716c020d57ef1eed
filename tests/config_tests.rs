use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use motivatebot::config::Config;
use motivatebot::errors::AppError;

const VARS: &[&str] = &[
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "MOTIVATEBOT_USERS_DIR",
    "MOTIVATEBOT_TEMPLATE",
    "MOTIVATEBOT_MODEL",
    "MOTIVATEBOT_SUMMARIZE",
];

/// Runs `test` inside `dir` with the relevant variables cleared, restoring
/// the working directory and variables afterwards.
fn in_clean_env<T>(dir: &std::path::Path, test: impl FnOnce() -> T) -> T {
    let saved: Vec<(&str, Option<String>)> =
        VARS.iter().map(|var| (*var, env::var(var).ok())).collect();
    for var in VARS {
        env::remove_var(var);
    }
    let original_dir = env::current_dir().unwrap();
    env::set_current_dir(dir).unwrap();

    let result = test();

    env::set_current_dir(original_dir).unwrap();
    for (var, value) in saved {
        match value {
            Some(value) => env::set_var(var, value),
            None => env::remove_var(var),
        }
    }
    result
}

#[test]
#[serial]
fn test_config_load_reads_dotenv_file() {
    let temp_dir = tempdir().unwrap();
    fs::write(
        temp_dir.path().join(".env"),
        "OPENAI_API_KEY=sk-from-dotenv\nMOTIVATEBOT_MODEL=gpt-4o-mini\nMOTIVATEBOT_SUMMARIZE=yes\n",
    )
    .unwrap();

    let config = in_clean_env(temp_dir.path(), || Config::load().unwrap());

    assert_eq!(config.api_key, "sk-from-dotenv");
    assert_eq!(config.model, "gpt-4o-mini");
    assert!(config.summarize);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_environment_wins_over_dotenv_file() {
    let temp_dir = tempdir().unwrap();
    fs::write(
        temp_dir.path().join(".env"),
        "OPENAI_API_KEY=sk-from-dotenv\nMOTIVATEBOT_USERS_DIR=/from/dotenv\n",
    )
    .unwrap();

    let config = in_clean_env(temp_dir.path(), || {
        env::set_var("MOTIVATEBOT_USERS_DIR", "/from/environment");
        Config::load().unwrap()
    });

    assert_eq!(config.users_dir, PathBuf::from("/from/environment"));
    assert_eq!(config.api_key, "sk-from-dotenv");
}

#[test]
#[serial]
fn test_config_load_without_dotenv_or_key() {
    let temp_dir = tempdir().unwrap();

    let config = in_clean_env(temp_dir.path(), || Config::load().unwrap());

    assert_eq!(config.template_path(), PathBuf::from("users/blank_profile.json"));
    match config.validate() {
        Err(AppError::Config(message)) => assert!(message.contains("OPENAI_API_KEY")),
        other => panic!("Expected missing key error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_template_follows_users_dir() {
    let temp_dir = tempdir().unwrap();

    let config = in_clean_env(temp_dir.path(), || {
        env::set_var("MOTIVATEBOT_USERS_DIR", "/srv/coach");
        Config::load().unwrap()
    });

    assert_eq!(
        config.template_path(),
        PathBuf::from("/srv/coach/blank_profile.json")
    );
}
