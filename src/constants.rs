//! Constants used throughout the application.
//!
//! This module contains all constants used in the MotivateBot application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "motivatebot";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A conversational motivation coach for the terminal";
/// Name the bot uses for itself in the terminal.
pub const BOT_DISPLAY_NAME: &str = "MotivateBot";

// Logging
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";

// Configuration Keys & Environment Variables
/// Environment variable holding the assistant service API key.
pub const ENV_VAR_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding the assistant service base URL.
pub const ENV_VAR_BASE_URL: &str = "OPENAI_BASE_URL";
/// Environment variable for the users root directory.
pub const ENV_VAR_USERS_DIR: &str = "MOTIVATEBOT_USERS_DIR";
/// Environment variable for the blank profile template path.
pub const ENV_VAR_TEMPLATE: &str = "MOTIVATEBOT_TEMPLATE";
/// Environment variable for the one-shot completion model.
pub const ENV_VAR_MODEL: &str = "MOTIVATEBOT_MODEL";
/// Environment variable for the main chat assistant id.
pub const ENV_VAR_MAIN_ASSISTANT: &str = "MOTIVATEBOT_MAIN_ASSISTANT";
/// Environment variable for the profile builder assistant id.
pub const ENV_VAR_PROFILE_ASSISTANT: &str = "MOTIVATEBOT_PROFILE_ASSISTANT";
/// Environment variable for the run poll interval in milliseconds.
pub const ENV_VAR_POLL_INTERVAL_MS: &str = "MOTIVATEBOT_POLL_INTERVAL_MS";
/// Environment variable for the run timeout in seconds.
pub const ENV_VAR_RUN_TIMEOUT_SECS: &str = "MOTIVATEBOT_RUN_TIMEOUT_SECS";
/// Environment variable enabling the end-of-session summary.
pub const ENV_VAR_SUMMARIZE: &str = "MOTIVATEBOT_SUMMARIZE";
/// Environment variable enabling the moderation gate.
pub const ENV_VAR_MODERATION: &str = "MOTIVATEBOT_MODERATION";

// Remote service defaults
/// Default base URL of the assistant service.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model for one-shot completions (router, moderation, summary).
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
/// Default assistant used for the main coaching conversation.
pub const DEFAULT_MAIN_ASSISTANT_ID: &str = "asst_VxB5X5MnbE1udKNdgOI2HzbQ";
/// Default assistant used to phrase profile interview questions.
pub const DEFAULT_PROFILE_ASSISTANT_ID: &str = "asst_mmvSEv260sF7lnHwia2bpHtJ";
/// Beta header value required by the threads and runs endpoints.
pub const ASSISTANTS_BETA_HEADER: &str = "assistants=v2";
/// Default interval between run status polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
/// Default upper bound on waiting for a single run.
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 120;
/// Timeout for a single HTTP request.
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 60;

// File System Layout
/// Default users root, relative to the working directory.
pub const DEFAULT_USERS_DIR: &str = "users";
/// File name of the shared blank profile template inside the users root.
pub const BLANK_PROFILE_FILE_NAME: &str = "blank_profile.json";
/// Suffix of a user's profile file (`<user>_profile.json`).
pub const PROFILE_FILE_SUFFIX: &str = "_profile.json";
/// Sub-directory of a user's directory holding session logs.
pub const LOGS_SUBDIR: &str = "logs";
/// Prefix of session log file names.
pub const SESSION_LOG_PREFIX: &str = "thread_log_";
/// Timestamp format of session log file names.
pub const SESSION_LOG_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
/// Format of the human-readable session date stored in the log.
pub const SESSION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Profile
/// Top-level template section walked by the interview.
pub const PERSONAL_INFO_KEY: &str = "personal_info";
/// Field supplied externally and never asked for.
pub const USER_NAME_KEY: &str = "user_name";
/// Status summary written after a completed interview.
pub const PROFILE_COLLECTED_SUMMARY: &str = "Personal information collected";

// Chat
/// Words that end a chat session (compared case-insensitively).
pub const EXIT_COMMANDS: &[&str] = &["exit", "quit"];
/// Sentinel text meaning "no advice for this turn".
pub const NO_ADVICE_SENTINEL: &str = "None";
/// Reply sent instead of a chat answer when moderation flags the input.
pub const MODERATION_REFUSAL: &str = "I'm sorry, but I can't respond to that kind of language.";
