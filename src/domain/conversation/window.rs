//! Context windows around a target message.
//!
//! A classification call for message `i` sees at most two messages on each
//! side of it. Windows borrow from the message list and are rebuilt per call.

use crate::domain::foundation::InvalidInputError;

use super::{Message, Role};

/// Messages included before the target.
pub const WINDOW_BEFORE: usize = 2;
/// Messages included after the target.
pub const WINDOW_AFTER: usize = 2;

/// One entry of a window: the author role and a borrowed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEntry<'a> {
    pub role: Role,
    pub text: &'a str,
}

/// Ordered slice of at most five messages centred on a target index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationWindow<'a> {
    start: usize,
    target: usize,
    entries: Vec<WindowEntry<'a>>,
}

impl<'a> ConversationWindow<'a> {
    pub fn entries(&self) -> &[WindowEntry<'a>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the first entry in the original message list.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Index of the target message in the original message list.
    pub fn target_index(&self) -> usize {
        self.target
    }

    pub fn target(&self) -> &WindowEntry<'a> {
        &self.entries[self.target - self.start]
    }

    /// Entries strictly after the target, in order.
    pub fn following(&self) -> &[WindowEntry<'a>] {
        &self.entries[self.target - self.start + 1..]
    }

    /// Renders the window as speaker-prefixed lines for a prompt.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.role.speaker_label(), e.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Builds the window `[max(0, index-2), min(len, index+3))` around `index`.
///
/// Windows at either end of the list are shorter; nothing is padded.
pub fn build_window(
    messages: &[Message],
    index: usize,
) -> Result<ConversationWindow<'_>, InvalidInputError> {
    if messages.is_empty() {
        return Err(InvalidInputError::EmptyMessages);
    }
    if index >= messages.len() {
        return Err(InvalidInputError::IndexOutOfBounds {
            index,
            len: messages.len(),
        });
    }

    let start = index.saturating_sub(WINDOW_BEFORE);
    let end = (index + WINDOW_AFTER + 1).min(messages.len());
    let entries = messages[start..end]
        .iter()
        .map(|m| WindowEntry {
            role: m.role,
            text: m.text.as_str(),
        })
        .collect();

    Ok(ConversationWindow {
        start,
        target: index,
        entries,
    })
}
