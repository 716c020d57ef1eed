/*!
# MotivateBot - A Motivation Coach for the Terminal

This file contains the main application flow: logging setup, configuration,
and handing the terminal over to the coach.

## Usage

```text
motivatebot [OPTIONS]

Options:
  -u, --user <USER>             User name; prompted for when omitted
      --users-dir <DIR>         Root directory for user profiles and session logs
      --template <PATH>         Blank profile template used to interview new users
      --summarize               Add a model-written summary to the session log
      --moderate                Refuse messages that contain harmful language
      --log-format <FORMAT>     Log output format [default: text] [possible values: text, json]
      --log-level <LEVEL>       Log level when RUST_LOG is not set [default: info]
  -v, --verbose                 Print debug logs
  -h, --help                    Print help
  -V, --version                 Print version
```

## Configuration

`OPENAI_API_KEY` is required. See the `config` module for the other
environment variables; a `.env` file in the working directory is read too.

## Interrupts

The first Ctrl-C cancels the assistant run being waited on and ends the chat
after the current line; the session log is still written. A second Ctrl-C
exits immediately.
*/

use motivatebot::ai::{CancellationToken, OpenAIClient};
use motivatebot::cli::CliArgs;
use motivatebot::config::Config;
use motivatebot::console::Console;
use motivatebot::constants::TRACING_ROOT_SPAN_NAME;
use motivatebot::errors::AppResult;
use motivatebot::ops;
use std::process::ExitCode;
use std::thread;
use tracing::{debug, error, info, info_span, warn};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(&args);

    let correlation_id = Uuid::new_v4();
    let root_span = info_span!(TRACING_ROOT_SPAN_NAME, correlation_id = %correlation_id);
    let _guard = root_span.enter();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Application error: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so the conversation on stdout stays readable.
fn init_tracing(args: &CliArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs() {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn run(args: CliArgs) -> AppResult<()> {
    info!("Starting motivatebot");
    debug!("CLI arguments: {:?}", args);

    let mut config = Config::load()?;
    args.apply_to(&mut config)?;
    config.validate()?;
    debug!("Configuration: {:?}", config);
    spawn_interrupt_handler(config.interrupt.clone())?;

    let client = OpenAIClient::new(&config.base_url, &config.api_key)?;
    let mut console = Console::stdio();
    ops::run_coach(&client, &config, args.user.as_deref(), &mut console)?;

    info!("Session complete");
    Ok(())
}

/// Exit status for a process ended by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Watches for Ctrl-C on a background thread with its own runtime.
///
/// The first interrupt cancels `interrupt`; the second ends the process.
fn spawn_interrupt_handler(interrupt: CancellationToken) -> AppResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("interrupt".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                    return;
                }
                warn!("Interrupted; finishing the session. Press Ctrl-C again to quit now.");
                interrupt.cancel();

                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            })
        })?;
    Ok(())
}
