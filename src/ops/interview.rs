//! Conversational profile building.
//!
//! The interview walks the `personal_info` section of a blank profile
//! template depth-first, in file order. Every placeholder leaf becomes one
//! question: the profile-builder assistant phrases it in a thread dedicated to
//! the interview, and the user's answer is written into the leaf and echoed
//! back to the thread so later questions have context.

use crate::ai::prompts::{answer_note, interview_intro, question_instruction};
use crate::ai::{AssistantService, Role, RunPoller};
use crate::console::AnswerSource;
use crate::constants::{PROFILE_COLLECTED_SUMMARY, USER_NAME_KEY};
use crate::errors::AppResult;
use crate::profile::{validate_user_name, ProfileNode, UserProfile};
use crate::store::ProfileStore;
use chrono::Local;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// One interview with one user, over one remote thread.
pub struct ProfileInterview<'a, S: AssistantService + ?Sized> {
    service: &'a S,
    poller: &'a RunPoller,
    assistant_id: &'a str,
    user_name: &'a str,
}

impl<'a, S: AssistantService + ?Sized> ProfileInterview<'a, S> {
    /// Prepares an interview; nothing is sent until `run`.
    pub fn new(
        service: &'a S,
        poller: &'a RunPoller,
        assistant_id: &'a str,
        user_name: &'a str,
    ) -> Self {
        Self {
            service,
            poller,
            assistant_id,
            user_name,
        }
    }

    /// Fills every placeholder leaf of `template.personal_info`.
    ///
    /// Leaves that already hold a value and fields named `user_name` are left
    /// alone. On success the profile carries the user's name and a fresh
    /// status; the shape of the tree is unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first remote or input error; the partially filled profile
    /// is discarded.
    pub fn run(
        &self,
        mut template: UserProfile,
        answers: &mut dyn AnswerSource,
    ) -> AppResult<UserProfile> {
        validate_user_name(self.user_name)?;
        info!(
            "Starting profile interview with {} open questions",
            template.personal_info.open_question_count()
        );

        let thread_id = self.service.create_thread()?;
        self.service
            .add_message(&thread_id, Role::User, &interview_intro(self.user_name))?;

        let asked = self.fill(&thread_id, &mut template.personal_info, answers)?;

        template.mark_collected(self.user_name, PROFILE_COLLECTED_SUMMARY, Local::now());
        info!("Profile interview finished after {} questions", asked);
        Ok(template)
    }

    fn fill(
        &self,
        thread_id: &str,
        node: &mut ProfileNode,
        answers: &mut dyn AnswerSource,
    ) -> AppResult<usize> {
        let children = match node {
            ProfileNode::Branch(children) => children,
            ProfileNode::Leaf(_) => return Ok(0),
        };

        let mut asked = 0;
        for (key, child) in children.iter_mut() {
            if key == USER_NAME_KEY {
                continue;
            }
            if matches!(child, ProfileNode::Branch(_)) {
                asked += self.fill(thread_id, child, answers)?;
            } else if child.is_placeholder() {
                let answer = self.ask(thread_id, key, answers)?;
                *child = ProfileNode::Leaf(Value::String(answer));
                asked += 1;
            } else {
                debug!("Keeping existing value for '{}'", key);
            }
        }
        Ok(asked)
    }

    fn ask(
        &self,
        thread_id: &str,
        key: &str,
        answers: &mut dyn AnswerSource,
    ) -> AppResult<String> {
        debug!("Asking for field '{}'", key);
        self.service.add_message(
            thread_id,
            Role::User,
            &question_instruction(self.user_name, key),
        )?;

        let run = self.service.create_run(thread_id, self.assistant_id, None)?;
        self.poller.wait_for_completion(self.service, thread_id, run)?;
        let question = self.service.latest_message(thread_id)?;

        let answer = loop {
            let answer = answers.answer(&question)?;
            if !answer.trim().is_empty() {
                break answer;
            }
        };

        self.service.add_message(
            thread_id,
            Role::User,
            &answer_note(self.user_name, key, &answer),
        )?;
        Ok(answer)
    }
}

/// Builds and stores a new profile from the blank template.
///
/// # Errors
///
/// Returns an error if the template cannot be loaded, the interview fails, or
/// the profile cannot be written.
pub fn build_user_profile<S: AssistantService + ?Sized>(
    service: &S,
    poller: &RunPoller,
    assistant_id: &str,
    store: &ProfileStore,
    template_path: &Path,
    user_name: &str,
    answers: &mut dyn AnswerSource,
) -> AppResult<UserProfile> {
    let template = UserProfile::load_template(template_path)?;
    let profile =
        ProfileInterview::new(service, poller, assistant_id, user_name).run(template, answers)?;
    store.save_profile(&profile)?;
    Ok(profile)
}
