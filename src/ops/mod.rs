//! High-level operations for the coach.
//!
//! This module orchestrates the building blocks in `ai`, `profile` and
//! `store`: the profile interview, per-turn advice routing and moderation,
//! the chat session loop, and a complete invocation tying them together.

pub mod advice;
pub mod coach;
pub mod interview;
pub mod moderation;
pub mod session;

// Re-export commonly used items
pub use advice::{Advice, AdviceDecision, AdviceMethod, AdviceRouter};
pub use coach::run_coach;
pub use interview::{build_user_profile, ProfileInterview};
pub use moderation::{ModerationGate, Verdict};
pub use session::{is_exit_command, run_chat_loop, ChatSession, ChatSettings, ThreadState, Transcript};
