//! Remote assistant service integration.
//!
//! This module provides the blocking HTTP client for the hosted assistant
//! service (stateful threads and runs plus one-shot chat completions), the
//! bounded run poller, the system prompts, and the `AssistantService` trait
//! that the rest of the crate talks to.
//!
//! # Module Structure
//!
//! - `openai`: HTTP client for the assistant API
//! - `polling`: Bounded wait for asynchronous runs
//! - `prompts`: System prompts and message builders
//! - `fake`: Scripted in-memory service for tests
//!
//! # Example
//!
//! ```no_run
//! use motivatebot::ai::{AssistantService, Message, OpenAIClient};
//!
//! let client = OpenAIClient::new("https://api.openai.com/v1", "sk-...")?;
//! let reply = client.chat_completion("gpt-4o", &[Message::user("Hello")])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod fake;
pub mod openai;
pub mod polling;
pub mod prompts;

use crate::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use fake::ScriptedAssistant;
pub use openai::OpenAIClient;
pub use polling::{CancellationToken, RunPoller};

/// The author of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions or error notes injected by the application
    System,
    /// The person chatting
    User,
    /// The remote assistant
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a chat conversation; also one turn of a session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// The content of the message
    pub content: String,
}

impl Message {
    /// Creates a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Creates a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Lifecycle state of a remote run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    /// Any status this client does not know about yet.
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Returns true when the run will not change state any more on its own.
    ///
    /// `requires_action` counts as terminal: no tools are registered, so the
    /// run would wait for a tool output that never comes.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling | RunStatus::Unknown
        )
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }
}

/// A run as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
}

/// Operations the application needs from the hosted assistant service.
///
/// Identifiers (threads, runs, assistants) are opaque strings owned by the
/// service.
pub trait AssistantService {
    /// Creates a stateful conversation thread and returns its id.
    fn create_thread(&self) -> AppResult<String>;

    /// Appends a message to a thread.
    fn add_message(&self, thread_id: &str, role: Role, content: &str) -> AppResult<()>;

    /// Starts an asynchronous run of `assistant_id` against a thread.
    fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
        additional_instructions: Option<&str>,
    ) -> AppResult<Run>;

    /// Fetches the current state of a run.
    fn retrieve_run(&self, thread_id: &str, run_id: &str) -> AppResult<Run>;

    /// Returns the text of the most recent message in a thread.
    fn latest_message(&self, thread_id: &str) -> AppResult<String>;

    /// Stateless completion over a list of role-tagged messages.
    fn chat_completion(&self, model: &str, messages: &[Message]) -> AppResult<String>;
}

impl<T: AssistantService + ?Sized> AssistantService for &T {
    fn create_thread(&self) -> AppResult<String> {
        (**self).create_thread()
    }

    fn add_message(&self, thread_id: &str, role: Role, content: &str) -> AppResult<()> {
        (**self).add_message(thread_id, role, content)
    }

    fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
        additional_instructions: Option<&str>,
    ) -> AppResult<Run> {
        (**self).create_run(thread_id, assistant_id, additional_instructions)
    }

    fn retrieve_run(&self, thread_id: &str, run_id: &str) -> AppResult<Run> {
        (**self).retrieve_run(thread_id, run_id)
    }

    fn latest_message(&self, thread_id: &str) -> AppResult<String> {
        (**self).latest_message(thread_id)
    }

    fn chat_completion(&self, model: &str, messages: &[Message]) -> AppResult<String> {
        (**self).chat_completion(model, messages)
    }
}
