//! Classification of user replies during the ticket hand-off.
//!
//! Inputs are expected to be trimmed already. Anything that doesn't fit the
//! expected shape is reported as a [`ValidationError`] so the caller can
//! re-prompt without changing state.

use regex::Regex;
use std::sync::LazyLock;

static AFFIRMATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(yes|yeah|yup|sure|ok|yep)\b").expect("valid regex"));

static NEGATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(no|nope|nah)\b").expect("valid regex"));

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Words that abandon email collection. Matched exactly, ignoring case.
pub const CANCEL_WORDS: &[&str] = &[
    "no",
    "cancel",
    "stop",
    "nevermind",
    "no thanks",
    "no thank you",
];

/// Answer to "would you like a support ticket?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The user wants a ticket.
    Affirmative,
    /// The user declined.
    Negative,
}

/// Reply received while collecting an email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailReply<'a> {
    /// The user abandoned the hand-off.
    Cancel,
    /// A plausibly shaped email address.
    Address(&'a str),
}

/// Classify a yes/no reply.
///
/// Affirmative and negative words only need to lead the reply, so
/// "yes please" counts as a yes while "yesterday" does not.
pub fn classify_confirmation(text: &str) -> Result<Confirmation, ValidationError> {
    if AFFIRMATIVE.is_match(text) {
        Ok(Confirmation::Affirmative)
    } else if NEGATIVE.is_match(text) {
        Ok(Confirmation::Negative)
    } else {
        Err(ValidationError::UnclearConfirmation)
    }
}

/// Check if a reply is one of the [`CANCEL_WORDS`].
pub fn is_cancel(text: &str) -> bool {
    CANCEL_WORDS
        .iter()
        .any(|word| text.eq_ignore_ascii_case(word))
}

/// Check if text has the minimal shape of an email address.
pub fn looks_like_email(text: &str) -> bool {
    EMAIL_SHAPE.is_match(text)
}

/// Interpret a reply to the email prompt. Cancellation wins over validation.
pub fn parse_email_reply(text: &str) -> Result<EmailReply<'_>, ValidationError> {
    if is_cancel(text) {
        Ok(EmailReply::Cancel)
    } else if looks_like_email(text) {
        Ok(EmailReply::Address(text))
    } else {
        Err(ValidationError::MalformedEmail)
    }
}

/// A reply that didn't match what the current state expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Neither an affirmative nor a negative answer.
    #[error("reply is neither yes nor no")]
    UnclearConfirmation,

    /// Not shaped like an email address.
    #[error("reply is not a valid email address")]
    MalformedEmail,
}
