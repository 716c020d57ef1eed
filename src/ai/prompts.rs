//! System prompts and message builders for assistant interactions.
//!
//! This module provides the fixed prompt texts and small builders that turn
//! session state into messages for the profile interview, the advice router,
//! the moderation gate, the main chat and the session summarizer.

use super::Message;

/// System prompt for the advice method selector.
///
/// The selector must answer with exactly one of the four tokens and judge
/// only the current input; earlier turns are context.
pub const METHOD_SELECTOR_PROMPT: &str = r#"You consult to the main motivation bot. Your role is to understand which method is the best to use for the user's needs. You have one of the methods to choose from:
'method_1' - Framing tasks in terms of their importance for larger goals ("remember, you want to do well on this test so you can..." [live a good life / be an awesome programmer / become a doctor / ...])
'method_2' - Framing tasks in terms of social connection ("Your mother will be proud of you", "your boss counts on you", "your clients need your help")
'method_3' - Making the future present ("In five years, when you look at yourself, do you want to be the person who did this today?")
'None' - No method is currently suitable for the user's needs.
Return ONLY one of the following options: 'method_1', 'method_2', 'method_3' or 'None'.
Very important: choose a method only if it is relevant to the user's CURRENT input. For example, if the user thanks the bot you should choose 'None', even if earlier in the conversation they said something relevant to one of the methods."#;

/// Framing technique of `method_1`.
pub const LARGER_GOALS_FRAMING: &str = r#"frame tasks in terms of their importance for larger goals ("remember, you want to do well on this test so you can..." [live a good life / be an awesome programmer / become a doctor / ...])"#;

/// Framing technique of `method_2`.
pub const SOCIAL_CONNECTION_FRAMING: &str = r#"frame tasks in terms of social connection ("Your mother will be proud of you", "your boss counts on you", "your clients need your help")"#;

/// Framing technique of `method_3`.
pub const FUTURE_PRESENT_FRAMING: &str = r#"make the future present ("In five years, when you look at yourself, do you want to be the person who did this today?")"#;

/// Opening every piece of elaborated advice.
pub const ADVICE_PREFIX: &str = "Advice on how to advise the user: ";

/// System prompt for the end-of-session summarizer.
pub const SUMMARIZER_PROMPT: &str = r#"You summarize coaching conversations between a user and a motivation bot.
Write a short summary (3-5 sentences) covering what the user was working on, what was hard for them, which encouragement helped, and any commitments they made.
Write in the third person and do not invent details that are not in the conversation."#;

/// System prompt for the moderation gate.
pub const MODERATION_PROMPT: &str = r#"You check chat messages for harmful language (insults, harassment, hate, threats or self-harm encouragement).
Respond with 'HARMFUL' if the message contains harmful language, or 'SAFE' if it doesn't. Respond with a single word."#;

/// Base instructions sent with every main chat run.
pub const CHAT_INSTRUCTIONS: &str = "Hold a chat with the user.";

/// First message of a profile interview thread.
pub fn interview_intro(user_name: &str) -> String {
    format!(
        "You are a friendly assistant (which uses emojis) helping to build a user profile for {user} (don't use the name too frequently). \
         Ask one question at a time and wait for the user's response before moving to the next question. \
         Focus only on personal information. Remember it's a set of questions so don't greet the user.",
        user = user_name
    )
}

/// Instruction asking the interviewer to phrase a question for one field.
///
/// The raw key, with underscores read as spaces, is always part of the
/// instruction.
pub fn question_instruction(user_name: &str, field_key: &str) -> String {
    format!(
        "Please ask {} for their {}.",
        user_name,
        field_key.replace('_', " ")
    )
}

/// Note recording the user's answer for one field.
pub fn answer_note(user_name: &str, field_key: &str, answer: &str) -> String {
    format!("{}'s response for {}: {}", user_name, field_key, answer)
}

/// Builds messages for choosing an advice method.
///
/// # Arguments
///
/// * `user_input` - The newest user utterance
/// * `transcript_json` - The whole transcript so far, serialized
pub fn method_selector_prompt(user_input: &str, transcript_json: &str) -> Vec<Message> {
    vec![
        Message::system(METHOD_SELECTOR_PROMPT),
        Message::user(format!(
            "The current user input: {}. \n\n The full context: {}",
            user_input, transcript_json
        )),
    ]
}

/// Builds messages for elaborating advice in one framing.
pub fn advice_prompt(framing: &str, transcript_json: &str) -> Vec<Message> {
    vec![
        Message::system(format!(
            "You are a consultant to the main motivation bot. You should give a short advice to the main motivation bot on how to advise the user, based on the following method:\n\
             {}.\n\
             Start your advice with '{}' and then provide your advice.",
            framing, ADVICE_PREFIX
        )),
        Message::user(transcript_json.to_string()),
    ]
}

/// Builds messages for the moderation check of one user message.
pub fn moderation_prompt(user_input: &str) -> Vec<Message> {
    vec![
        Message::system(MODERATION_PROMPT),
        Message::user(format!(
            "Check if this message contains harmful language: '{}'",
            user_input
        )),
    ]
}

/// Builds messages for summarizing a finished session.
pub fn summary_prompt(transcript_json: &str) -> Vec<Message> {
    vec![
        Message::system(SUMMARIZER_PROMPT),
        Message::user(format!("Conversation:\n{}", transcript_json)),
    ]
}

/// Message posted to the main chat thread for one turn.
pub fn chat_turn_message(user_input: &str, advice: &str) -> String {
    format!("user_input: {}, consultance input: {}", user_input, advice)
}

/// Additional run instructions for the main chat, with the profile when known.
pub fn chat_instructions(profile_json: Option<&str>) -> String {
    match profile_json {
        Some(profile) => format!("{} User profile: {}", CHAT_INSTRUCTIONS, profile),
        None => CHAT_INSTRUCTIONS.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Role;

    #[test]
    fn test_method_selector_prompt_structure() {
        let messages = method_selector_prompt("thanks!", r#"[{"role":"user"}]"#);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, METHOD_SELECTOR_PROMPT);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.contains("The current user input: thanks!"));
        assert!(messages[1].content.contains(r#"[{"role":"user"}]"#));
    }

    #[test]
    fn test_selector_prompt_names_all_options() {
        for token in ["method_1", "method_2", "method_3", "None"] {
            assert!(METHOD_SELECTOR_PROMPT.contains(token));
        }
        assert!(METHOD_SELECTOR_PROMPT.contains("CURRENT input"));
    }

    #[test]
    fn test_advice_prompt_includes_framing_and_prefix() {
        let messages = advice_prompt(SOCIAL_CONNECTION_FRAMING, "[]");
        assert!(messages[0].content.contains("social connection"));
        assert!(messages[0].content.contains(ADVICE_PREFIX));
        assert_eq!(messages[1].content, "[]");
    }

    #[test]
    fn test_question_instruction_replaces_underscores() {
        assert_eq!(
            question_instruction("alice", "favorite_hobby"),
            "Please ask alice for their favorite hobby."
        );
        assert_eq!(
            answer_note("alice", "favorite_hobby", "climbing"),
            "alice's response for favorite_hobby: climbing"
        );
    }

    #[test]
    fn test_chat_instructions_with_and_without_profile() {
        assert_eq!(chat_instructions(None), CHAT_INSTRUCTIONS);
        let with_profile = chat_instructions(Some(r#"{"user_name":"alice"}"#));
        assert!(with_profile.starts_with(CHAT_INSTRUCTIONS));
        assert!(with_profile.contains(r#"User profile: {"user_name":"alice"}"#));
    }

    #[test]
    fn test_chat_turn_message_format() {
        assert_eq!(
            chat_turn_message("I can't start my essay", "None"),
            "user_input: I can't start my essay, consultance input: None"
        );
    }
}
