//! Optional harmful-language check on user input.

use crate::ai::prompts::moderation_prompt;
use crate::ai::AssistantService;
use crate::errors::AppResult;
use tracing::{debug, warn};

/// Result of checking one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Safe,
    Harmful,
}

impl Verdict {
    /// Decodes checker output; only a `HARMFUL` token (any case) flags input.
    pub fn decode(output: &str) -> Self {
        if output.to_uppercase().contains("HARMFUL") {
            Verdict::Harmful
        } else {
            Verdict::Safe
        }
    }
}

/// One-shot moderation check.
pub struct ModerationGate<'a, S: AssistantService + ?Sized> {
    service: &'a S,
    model: &'a str,
}

impl<'a, S: AssistantService + ?Sized> ModerationGate<'a, S> {
    pub fn new(service: &'a S, model: &'a str) -> Self {
        Self { service, model }
    }

    pub fn check(&self, user_input: &str) -> AppResult<Verdict> {
        let output = self
            .service
            .chat_completion(self.model, &moderation_prompt(user_input))?;
        let verdict = Verdict::decode(&output);
        match verdict {
            Verdict::Harmful => warn!("Moderation flagged user input"),
            Verdict::Safe => debug!("Moderation passed user input"),
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ScriptedAssistant;

    #[test]
    fn test_decode() {
        assert_eq!(Verdict::decode("HARMFUL"), Verdict::Harmful);
        assert_eq!(Verdict::decode("harmful."), Verdict::Harmful);
        assert_eq!(Verdict::decode("SAFE"), Verdict::Safe);
        assert_eq!(Verdict::decode(""), Verdict::Safe);
    }

    #[test]
    fn test_check_sends_the_message() {
        let service = ScriptedAssistant::new().with_completion("SAFE");
        let gate = ModerationGate::new(&service, "gpt-4o");

        assert_eq!(gate.check("I want to quit my job").unwrap(), Verdict::Safe);
        let calls = service.completion_calls();
        assert!(calls[0].messages[1].content.contains("I want to quit my job"));
    }
}
