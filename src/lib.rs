/*!
# MotivateBot

MotivateBot is a conversational motivation coach for the terminal. It chats
with the user through a hosted assistant service, consults a secondary
"advice method" classifier on every turn, and keeps a per-user profile and
per-session logs as flat JSON files.

## Core Features

- Interview new users to fill in a profile template, one question per field
- Route every chat turn through a three-way motivational framing classifier
- Optionally refuse harmful input before it reaches the assistant
- Save each session as a timestamped JSON log, optionally with a summary

## Architecture

- `ai`: Assistant service trait, HTTP client, run polling and prompts
- `cli`: Command-line interface handling using clap
- `config`: Configuration loading and validation
- `console`: Line-oriented terminal input and output
- `errors`: Error handling infrastructure
- `ops`: Interview, advice routing, moderation and the chat session
- `profile`: Profile template tree and user profile types
- `store`: Flat-file storage for profiles and session logs

## Usage Example

```rust,no_run
use motivatebot::ai::OpenAIClient;
use motivatebot::console::Console;
use motivatebot::{ops, Config};

fn main() -> motivatebot::AppResult<()> {
    let config = Config::load()?;
    config.validate()?;

    let client = OpenAIClient::new(&config.base_url, &config.api_key)?;
    let mut console = Console::stdio();
    ops::run_coach(&client, &config, Some("alice"), &mut console)?;
    Ok(())
}
```
*/

/// Assistant service access: trait, HTTP client, polling and prompts
pub mod ai;
/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Terminal input and output
pub mod console;
/// Application-wide constants
pub mod constants;
/// Error types and utilities for error handling
pub mod errors;
/// High-level coaching operations
pub mod ops;
/// Profile template and user profile types
pub mod profile;
/// Flat-file persistence
pub mod store;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
