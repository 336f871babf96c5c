//! Conversation state for a widget instance.
//!
//! A widget is either ready for a new question or in the middle of the
//! support-ticket hand-off. The hand-off states carry the question that
//! could not be answered so it can be attached to the ticket.

use serde::{Deserialize, Serialize};

/// All states a conversation can be in.
///
/// Exactly one state is active at a time. A fresh widget starts in `Idle`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum ConversationState {
    /// Ready to accept a new question.
    #[default]
    Idle,
    /// The backend couldn't answer; waiting for a yes/no on opening a ticket.
    AwaitingHandoffConfirmation { question: String },
    /// The user agreed to a ticket; waiting for a valid email address.
    AwaitingEmail { question: String },
}

impl ConversationState {
    /// The unanswered question carried by a hand-off state.
    pub fn pending_question(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::AwaitingHandoffConfirmation { question } | Self::AwaitingEmail { question } => {
                Some(question)
            }
        }
    }

    /// Check if the widget is ready for a new question.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Human-readable name for logs and status output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::AwaitingHandoffConfirmation { .. } => "Awaiting Hand-off Confirmation",
            Self::AwaitingEmail { .. } => "Awaiting Email",
        }
    }

    /// Placeholder text for the input area.
    ///
    /// Tells the user what kind of reply the widget expects next.
    #[must_use]
    pub fn input_hint(&self) -> &'static str {
        match self {
            Self::Idle => "Ask a question...",
            Self::AwaitingHandoffConfirmation { .. } => "Answer yes or no...",
            Self::AwaitingEmail { .. } => "Enter your email, or type cancel...",
        }
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
