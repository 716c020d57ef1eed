//! Scripted in-memory assistant service for tests.
//!
//! `ScriptedAssistant` answers from queues filled in advance and records every
//! call, so interview, router and session behavior can be checked without a
//! network.

use super::{AssistantService, Message, Role, Run, RunStatus};
use crate::errors::{AIError, AppResult};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A message posted to a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub thread_id: String,
    pub role: Role,
    pub content: String,
}

/// A run started on a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedRun {
    pub thread_id: String,
    pub assistant_id: String,
    pub additional_instructions: Option<String>,
}

/// A one-shot completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCall {
    pub model: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Default)]
struct State {
    completions: VecDeque<Result<String, String>>,
    thread_replies: VecDeque<Result<String, String>>,
    run_progression: Vec<RunStatus>,
    fail_thread_creation: Option<String>,

    threads_created: usize,
    runs_started: Vec<StartedRun>,
    retrieve_count: usize,
    posted: Vec<PostedMessage>,
    completion_calls: Vec<CompletionCall>,
}

/// Assistant service double with scripted answers.
///
/// Runs start `queued`; each `retrieve_run` takes the next status from the
/// run progression (repeating the last one), or reports `completed` when no
/// progression is set. Empty reply queues produce an API error.
#[derive(Debug, Default)]
pub struct ScriptedAssistant {
    state: Mutex<State>,
}

impl ScriptedAssistant {
    /// Creates a fake with empty scripts.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a successful one-shot completion.
    pub fn with_completion(self, text: impl Into<String>) -> Self {
        self.state().completions.push_back(Ok(text.into()));
        self
    }

    /// Queues a failing one-shot completion.
    pub fn with_completion_error(self, message: impl Into<String>) -> Self {
        self.state().completions.push_back(Err(message.into()));
        self
    }

    /// Queues the text returned by the next `latest_message`.
    pub fn with_thread_reply(self, text: impl Into<String>) -> Self {
        self.state().thread_replies.push_back(Ok(text.into()));
        self
    }

    /// Queues a failure for the next `latest_message`.
    pub fn with_thread_reply_error(self, message: impl Into<String>) -> Self {
        self.state().thread_replies.push_back(Err(message.into()));
        self
    }

    /// Sets the statuses returned by successive `retrieve_run` calls.
    pub fn with_run_progression(self, statuses: Vec<RunStatus>) -> Self {
        self.state().run_progression = statuses;
        self
    }

    /// Makes `create_thread` fail with the given message.
    pub fn failing_thread_creation(self, message: impl Into<String>) -> Self {
        self.state().fail_thread_creation = Some(message.into());
        self
    }

    /// Number of threads created so far.
    pub fn threads_created(&self) -> usize {
        self.state().threads_created
    }

    /// Runs started so far, oldest first.
    pub fn runs_started(&self) -> Vec<StartedRun> {
        self.state().runs_started.clone()
    }

    /// Number of `retrieve_run` calls so far.
    pub fn retrieve_count(&self) -> usize {
        self.state().retrieve_count
    }

    /// Messages posted to threads so far, oldest first.
    pub fn posted_messages(&self) -> Vec<PostedMessage> {
        self.state().posted.clone()
    }

    /// One-shot completion requests so far, oldest first.
    pub fn completion_calls(&self) -> Vec<CompletionCall> {
        self.state().completion_calls.clone()
    }

    fn scripted(entry: Option<Result<String, String>>, what: &str) -> AppResult<String> {
        match entry {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(AIError::Api {
                status: 500,
                message,
            }
            .into()),
            None => Err(AIError::Api {
                status: 500,
                message: format!("no scripted {} left", what),
            }
            .into()),
        }
    }
}

impl AssistantService for ScriptedAssistant {
    fn create_thread(&self) -> AppResult<String> {
        let mut state = self.state();
        if let Some(message) = state.fail_thread_creation.clone() {
            return Err(AIError::Api {
                status: 500,
                message,
            }
            .into());
        }
        state.threads_created += 1;
        Ok(format!("thread_{}", state.threads_created))
    }

    fn add_message(&self, thread_id: &str, role: Role, content: &str) -> AppResult<()> {
        self.state().posted.push(PostedMessage {
            thread_id: thread_id.to_string(),
            role,
            content: content.to_string(),
        });
        Ok(())
    }

    fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
        additional_instructions: Option<&str>,
    ) -> AppResult<Run> {
        let mut state = self.state();
        state.runs_started.push(StartedRun {
            thread_id: thread_id.to_string(),
            assistant_id: assistant_id.to_string(),
            additional_instructions: additional_instructions.map(str::to_string),
        });
        Ok(Run {
            id: format!("run_{}", state.runs_started.len()),
            status: RunStatus::Queued,
        })
    }

    fn retrieve_run(&self, _thread_id: &str, run_id: &str) -> AppResult<Run> {
        let mut state = self.state();
        state.retrieve_count += 1;
        let status = if state.run_progression.len() > 1 {
            state.run_progression.remove(0)
        } else {
            state
                .run_progression
                .first()
                .cloned()
                .unwrap_or(RunStatus::Completed)
        };
        Ok(Run {
            id: run_id.to_string(),
            status,
        })
    }

    fn latest_message(&self, _thread_id: &str) -> AppResult<String> {
        let entry = self.state().thread_replies.pop_front();
        Self::scripted(entry, "thread reply")
    }

    fn chat_completion(&self, model: &str, messages: &[Message]) -> AppResult<String> {
        let entry = {
            let mut state = self.state();
            state.completion_calls.push(CompletionCall {
                model: model.to_string(),
                messages: messages.to_vec(),
            });
            state.completions.pop_front()
        };
        Self::scripted(entry, "completion")
    }
}
