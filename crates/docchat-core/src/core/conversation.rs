//! Append-only conversation log.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Bot => f.write_str("bot"),
        }
    }
}

/// One message in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub sender: Sender,
    pub text: String,
}

/// Ordered user/bot turns. Insertion order is display order.
///
/// Turns are never edited or removed individually; the whole log is
/// discarded when a new attachment set is accepted.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub(crate) fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            sender: Sender::User,
            text: text.into(),
        });
    }

    pub(crate) fn push_bot(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            sender: Sender::Bot,
            text: text.into(),
        });
    }

    pub(crate) fn clear(&mut self) {
        self.turns.clear();
    }
}
