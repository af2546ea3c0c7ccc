//! Conversation module - chat messages and the context windows built from them.

mod message;
mod window;

pub use message::{Message, MessageId, Role};
pub use window::{build_window, ConversationWindow, WindowEntry, WINDOW_AFTER, WINDOW_BEFORE};
