//! deskchat-engine: Conversation engine for an embeddable support chat widget
//!
//! This crate provides the host-independent core of the widget, including:
//! - The conversation controller and its hand-off state machine
//! - Classification of yes/no and email replies
//! - The message sink and backend gateway seams
//! - An HTTP backend gateway and widget configuration

pub mod config;
pub mod conversation;
pub mod gateway;
pub mod intent;
pub mod messages;
pub mod sink;
pub mod state;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use config::{ConfigError, WidgetConfig};
pub use conversation::{ConversationController, Turn};
pub use gateway::{AnswerStatus, AskResult, BackendGateway, GatewayError, HttpGateway, TicketResult};
pub use intent::{classify_confirmation, parse_email_reply, Confirmation, EmailReply, ValidationError};
pub use sink::{MessageHandle, MessageSink, Origin, ShowOptions, Transcript, TranscriptEntry};
pub use state::ConversationState;

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
