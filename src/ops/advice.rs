//! Advice routing for the main chat.
//!
//! Each turn the router first asks a one-shot classifier which of three
//! motivational framings fits the user's current input, then, when one fits,
//! asks for concrete advice in that framing. The advice is passed to the main
//! assistant as extra context; it is never shown to the user directly.

use crate::ai::prompts::{
    advice_prompt, method_selector_prompt, FUTURE_PRESENT_FRAMING, LARGER_GOALS_FRAMING,
    SOCIAL_CONNECTION_FRAMING,
};
use crate::ai::{AssistantService, Message};
use crate::constants::NO_ADVICE_SENTINEL;
use crate::errors::AppResult;
use std::fmt;
use tracing::{debug, info};

/// The three motivational framings the router can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceMethod {
    /// `method_1`: tie the task to the user's larger goals.
    LargerGoals,
    /// `method_2`: tie the task to the people who count on the user.
    SocialConnection,
    /// `method_3`: make the user's future self present now.
    FuturePresent,
}

impl AdviceMethod {
    /// All methods, in the order the classifier output is searched.
    pub const ALL: [AdviceMethod; 3] = [
        AdviceMethod::LargerGoals,
        AdviceMethod::SocialConnection,
        AdviceMethod::FuturePresent,
    ];

    /// Token the classifier answers with.
    pub fn token(&self) -> &'static str {
        match self {
            AdviceMethod::LargerGoals => "method_1",
            AdviceMethod::SocialConnection => "method_2",
            AdviceMethod::FuturePresent => "method_3",
        }
    }

    /// Description of the framing technique.
    pub fn framing(&self) -> &'static str {
        match self {
            AdviceMethod::LargerGoals => LARGER_GOALS_FRAMING,
            AdviceMethod::SocialConnection => SOCIAL_CONNECTION_FRAMING,
            AdviceMethod::FuturePresent => FUTURE_PRESENT_FRAMING,
        }
    }
}

impl fmt::Display for AdviceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Outcome of classifying one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceDecision {
    Method(AdviceMethod),
    None,
}

impl AdviceDecision {
    /// Decodes free-text classifier output.
    ///
    /// The first method token found anywhere in the text wins, searched in
    /// `method_1`, `method_2`, `method_3` order. Anything else, including
    /// empty or unexpected output, is `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use motivatebot::ops::advice::{AdviceDecision, AdviceMethod};
    ///
    /// assert_eq!(
    ///     AdviceDecision::decode("'method_2'"),
    ///     AdviceDecision::Method(AdviceMethod::SocialConnection)
    /// );
    /// assert_eq!(AdviceDecision::decode("None"), AdviceDecision::None);
    /// assert_eq!(AdviceDecision::decode("I think method 4"), AdviceDecision::None);
    /// ```
    pub fn decode(output: &str) -> Self {
        AdviceMethod::ALL
            .into_iter()
            .find(|method| output.contains(method.token()))
            .map_or(AdviceDecision::None, AdviceDecision::Method)
    }
}

/// Advice for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advice {
    /// Advice text written in the chosen framing.
    Framed { method: AdviceMethod, text: String },
    /// No framing applies to this turn.
    None,
}

impl Advice {
    /// Text handed to the main assistant: the advice, or the `None` sentinel.
    pub fn as_context(&self) -> &str {
        match self {
            Advice::Framed { text, .. } => text,
            Advice::None => NO_ADVICE_SENTINEL,
        }
    }

    /// The chosen method, if any.
    pub fn method(&self) -> Option<AdviceMethod> {
        match self {
            Advice::Framed { method, .. } => Some(*method),
            Advice::None => None,
        }
    }
}

/// Two-stage advice pipeline over one-shot completions.
pub struct AdviceRouter<'a, S: AssistantService + ?Sized> {
    service: &'a S,
    model: &'a str,
}

impl<'a, S: AssistantService + ?Sized> AdviceRouter<'a, S> {
    pub fn new(service: &'a S, model: &'a str) -> Self {
        Self { service, model }
    }

    /// Picks a framing for the current input.
    ///
    /// Only the classifier's reply to this turn is decoded; earlier decisions
    /// are never reused.
    pub fn classify(&self, transcript: &[Message], user_input: &str) -> AppResult<AdviceDecision> {
        let transcript_json = serde_json::to_string(transcript)?;
        let output = self.service.chat_completion(
            self.model,
            &method_selector_prompt(user_input, &transcript_json),
        )?;
        let decision = AdviceDecision::decode(&output);
        debug!("Method selector answered {:?} -> {:?}", output, decision);
        Ok(decision)
    }

    /// Writes advice in one framing for the conversation so far.
    pub fn elaborate(&self, method: AdviceMethod, transcript: &[Message]) -> AppResult<String> {
        let transcript_json = serde_json::to_string(transcript)?;
        self.service
            .chat_completion(self.model, &advice_prompt(method.framing(), &transcript_json))
    }

    /// Runs both stages.
    ///
    /// # Errors
    ///
    /// Remote failures are returned unchanged; the caller decides how to
    /// report them.
    pub fn advise(&self, transcript: &[Message], user_input: &str) -> AppResult<Advice> {
        match self.classify(transcript, user_input)? {
            AdviceDecision::None => Ok(Advice::None),
            AdviceDecision::Method(method) => {
                info!("Advice method selected: {}", method);
                let text = self.elaborate(method, transcript)?;
                Ok(Advice::Framed { method, text })
            }
        }
    }
}
