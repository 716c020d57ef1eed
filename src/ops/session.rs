//! The main chat session.
//!
//! A session owns one remote thread, created lazily on the first turn, and an
//! in-memory transcript. Each turn goes through the optional moderation gate
//! and the advice router before the main assistant is asked for a reply.

use crate::ai::prompts::{chat_instructions, chat_turn_message, summary_prompt};
use crate::ai::{AssistantService, Message, Role, RunPoller};
use crate::console::Console;
use crate::constants::{EXIT_COMMANDS, MODERATION_REFUSAL, SESSION_DATE_FORMAT};
use crate::errors::AppResult;
use crate::ops::advice::AdviceRouter;
use crate::ops::moderation::{ModerationGate, Verdict};
use crate::profile::UserProfile;
use crate::store::{ProfileStore, SessionLog};
use chrono::{DateTime, Local};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Returns true for inputs that end the session (`exit`, `quit`, any case).
pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    EXIT_COMMANDS
        .iter()
        .any(|command| input.eq_ignore_ascii_case(command))
}

/// Ordered conversation turns of one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    turns: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.turns.push(message);
    }

    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turns to write to the session log: everything except a final exit
    /// command from the user.
    pub fn persistable(&self) -> Vec<Message> {
        match self.turns.split_last() {
            Some((last, rest)) if last.role == Role::User && is_exit_command(&last.content) => {
                rest.to_vec()
            }
            _ => self.turns.clone(),
        }
    }
}

/// Remote thread of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadState {
    NoThread,
    Active(String),
}

impl ThreadState {
    pub fn thread_id(&self) -> Option<&str> {
        match self {
            ThreadState::NoThread => None,
            ThreadState::Active(id) => Some(id),
        }
    }
}

/// Settings that shape every turn.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub main_assistant_id: String,
    pub model: String,
    pub moderation: bool,
}

/// One chat session with one user.
pub struct ChatSession<'a, S: AssistantService + ?Sized> {
    service: &'a S,
    poller: &'a RunPoller,
    settings: ChatSettings,
    user_name: String,
    profile_json: Option<String>,
    thread: ThreadState,
    transcript: Transcript,
    started_at: DateTime<Local>,
}

impl<'a, S: AssistantService + ?Sized> ChatSession<'a, S> {
    /// Starts a session; the remote thread is created on the first turn.
    ///
    /// The profile, when present, is sent as additional instructions with
    /// every run.
    pub fn new(
        service: &'a S,
        poller: &'a RunPoller,
        settings: ChatSettings,
        user_name: &str,
        profile: Option<&UserProfile>,
    ) -> AppResult<Self> {
        let profile_json = profile.map(serde_json::to_string).transpose()?;
        Ok(Self {
            service,
            poller,
            settings,
            user_name: user_name.to_string(),
            profile_json,
            thread: ThreadState::NoThread,
            transcript: Transcript::new(),
            started_at: Local::now(),
        })
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn thread(&self) -> &ThreadState {
        &self.thread
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// True once the run poller's cancellation token has fired.
    pub fn is_cancelled(&self) -> bool {
        self.poller.cancellation_token().is_cancelled()
    }

    /// Handles one user message and returns the text to show.
    ///
    /// Never fails: an error anywhere in the turn is recorded as a single
    /// system entry in the transcript and returned as the reply.
    pub fn turn(&mut self, user_input: &str) -> String {
        match self.try_turn(user_input) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Chat turn failed: {}", e);
                let reply = format!("An error occurred: {}", e);
                self.transcript.push(Message::system(reply.clone()));
                reply
            }
        }
    }

    /// Handles one user message, returning the first error.
    pub fn try_turn(&mut self, user_input: &str) -> AppResult<String> {
        self.transcript.push(Message::user(user_input));
        let thread_id = self.ensure_thread()?;

        if self.settings.moderation {
            let gate = ModerationGate::new(self.service, &self.settings.model);
            if gate.check(user_input)? == Verdict::Harmful {
                self.transcript.push(Message::assistant(MODERATION_REFUSAL));
                return Ok(MODERATION_REFUSAL.to_string());
            }
        }

        let router = AdviceRouter::new(self.service, &self.settings.model);
        let advice = router.advise(self.transcript.turns(), user_input)?;

        self.service.add_message(
            &thread_id,
            Role::User,
            &chat_turn_message(user_input, advice.as_context()),
        )?;

        let instructions = chat_instructions(self.profile_json.as_deref());
        let run = self.service.create_run(
            &thread_id,
            &self.settings.main_assistant_id,
            Some(&instructions),
        )?;
        self.poller
            .wait_for_completion(self.service, &thread_id, run)?;

        let reply = self.service.latest_message(&thread_id)?;
        self.transcript.push(Message::assistant(reply.clone()));
        Ok(reply)
    }

    fn ensure_thread(&mut self) -> AppResult<String> {
        if let ThreadState::Active(id) = &self.thread {
            return Ok(id.clone());
        }
        let id = self.service.create_thread()?;
        info!("Created chat thread {}", id);
        self.thread = ThreadState::Active(id.clone());
        Ok(id)
    }

    /// The session log as it would be written now, without a summary.
    pub fn build_log(&self) -> SessionLog {
        let thread_date = self.started_at.format(SESSION_DATE_FORMAT).to_string();
        SessionLog {
            thread_name: SessionLog::thread_name_for(&self.user_name, &thread_date),
            thread_id: self.thread.thread_id().map(str::to_string),
            assistant_id: self.settings.main_assistant_id.clone(),
            thread_date,
            chat: self.transcript.persistable(),
            summary: None,
        }
    }

    /// Asks the model to summarize the conversation.
    pub fn summarize(&self) -> AppResult<String> {
        let transcript_json = serde_json::to_string(&self.transcript.persistable())?;
        self.service
            .chat_completion(&self.settings.model, &summary_prompt(&transcript_json))
    }

    /// Writes the session log, optionally with a summary.
    ///
    /// A failed summary is logged and left out; write failures are returned.
    pub fn end_session(&self, store: &ProfileStore, summarize: bool) -> AppResult<PathBuf> {
        let mut log = self.build_log();
        if summarize {
            match self.summarize() {
                Ok(summary) => log.summary = Some(summary),
                Err(e) => warn!("Could not summarize the session: {}", e),
            }
        }
        store.save_session_log(&self.user_name, &log, Local::now())
    }
}

/// Runs the REPL until the user exits or input ends.
///
/// Blank lines are ignored. Returns the number of turns taken.
pub fn run_chat_loop<S, R, W>(
    session: &mut ChatSession<'_, S>,
    console: &mut Console<R, W>,
) -> AppResult<usize>
where
    S: AssistantService + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut turns = 0;
    loop {
        if session.is_cancelled() {
            info!("Session interrupted after {} turns", turns);
            break;
        }
        let line = match console.prompt("You: ")? {
            Some(line) => line,
            None => {
                console.say("")?;
                debug!("Input closed, ending session");
                break;
            }
        };
        if session.is_cancelled() {
            console.say("")?;
            info!("Session interrupted after {} turns", turns);
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_exit_command(input) {
            info!("User ended the session after {} turns", turns);
            break;
        }

        let reply = session.turn(input);
        console.say_as_bot(&reply)?;
        turns += 1;
    }
    Ok(turns)
}
