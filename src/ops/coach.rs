//! One complete coaching invocation: identify the user, make sure a profile
//! exists, chat, and write the session log.

use crate::ai::{AssistantService, RunPoller};
use crate::config::Config;
use crate::console::Console;
use crate::errors::AppResult;
use crate::ops::interview::build_user_profile;
use crate::ops::session::{run_chat_loop, ChatSession};
use crate::profile::{validate_user_name, UserProfile};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{info, info_span, warn};

/// Runs the coach from greeting to goodbye.
///
/// When `user_name` is `None` the user is asked for it. Returns the path of
/// the session log, or `None` if input ended before a name was given.
///
/// # Errors
///
/// Returns an error for an invalid `user_name`, an unreadable existing
/// profile, console failures, or a session log that cannot be written.
/// Interview failures are reported on the console and the chat continues
/// without a profile.
pub fn run_coach<S, R, W>(
    service: &S,
    config: &Config,
    user_name: Option<&str>,
    console: &mut Console<R, W>,
) -> AppResult<Option<PathBuf>>
where
    S: AssistantService + ?Sized,
    R: BufRead,
    W: Write,
{
    let user_name = match user_name {
        Some(name) => validate_user_name(name.trim())?.to_string(),
        None => match ask_user_name(console)? {
            Some(name) => name,
            None => return Ok(None),
        },
    };

    let _span = info_span!("coach_session", user = %user_name).entered();
    let store = config.profile_store();
    let poller = config.run_poller();

    let profile = match store.load_profile(&user_name)? {
        Some(profile) => {
            console.say(&format!("Welcome back, {}!", user_name))?;
            Some(profile)
        }
        None => {
            console.say(&format!(
                "Welcome, {}! It seems you're new here. Let's create your user profile.",
                user_name
            ))?;
            interview(service, config, &poller, &user_name, console)?
        }
    };

    console.say("Chat with the MotivateBot. Type 'exit' to end the chat.")?;
    let mut session = ChatSession::new(
        service,
        &poller,
        config.chat_settings(),
        &user_name,
        profile.as_ref(),
    )?;
    let turns = run_chat_loop(&mut session, console)?;

    let path = session.end_session(&store, config.summarize)?;
    info!("Session finished after {} turns", turns);
    console.say("Chat ended. Goodbye!")?;
    console.say(&format!("Chat log saved to {}", path.display()))?;
    Ok(Some(path))
}

fn interview<S, R, W>(
    service: &S,
    config: &Config,
    poller: &RunPoller,
    user_name: &str,
    console: &mut Console<R, W>,
) -> AppResult<Option<UserProfile>>
where
    S: AssistantService + ?Sized,
    R: BufRead,
    W: Write,
{
    let store = config.profile_store();
    match build_user_profile(
        service,
        poller,
        &config.profile_assistant_id,
        &store,
        &config.template_path(),
        user_name,
        console,
    ) {
        Ok(profile) => Ok(Some(profile)),
        Err(e) => {
            warn!("Profile interview failed: {}", e);
            console.say(&format!(
                "An error occurred while building the user profile: {}",
                e
            ))?;
            Ok(None)
        }
    }
}

/// Prompts until a usable name is entered; `None` at end of input.
fn ask_user_name<R: BufRead, W: Write>(console: &mut Console<R, W>) -> AppResult<Option<String>> {
    loop {
        let line = match console.prompt("Please enter your user name: ")? {
            Some(line) => line,
            None => return Ok(None),
        };
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        match validate_user_name(name) {
            Ok(name) => return Ok(Some(name.to_string())),
            Err(e) => console.say(&e.to_string())?,
        }
    }
}
