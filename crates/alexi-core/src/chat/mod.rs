//! Chat domain: turns and the active conversation.

mod conversation;

pub use conversation::{ChatTurn, Conversation, TurnRole};
