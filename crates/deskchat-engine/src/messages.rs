//! Fixed bot replies.

/// Offered after the backend signals that it could not answer.
pub const HANDOFF_PROMPT: &str = "Would you like me to create a support ticket for you so a human agent can get back to you? (yes/no)";

/// Shown when an ask call fails.
pub const CONNECTION_FAILURE: &str = "Sorry, I'm having trouble connecting. Please try again later.";

/// Shown after the user agrees to a ticket.
pub const EMAIL_REQUEST: &str = "Great. What's the best email address to reach you at?";

/// Shown after the user declines a ticket.
pub const HANDOFF_DECLINED: &str = "No problem. Is there anything else I can help you with?";

/// Re-prompt for an answer that is neither yes nor no.
pub const CONFIRMATION_REPROMPT: &str =
    "Sorry, I didn't quite understand. Please answer with 'yes' or 'no'.";

/// Re-prompt for a malformed email address.
pub const INVALID_EMAIL: &str =
    "That doesn't look like a valid email. Please try again, or type 'cancel' to stop.";

/// Shown when the user abandons email collection.
pub const TICKET_CANCELLED: &str =
    "Okay, I won't create a ticket. Is there anything else I can help you with?";

/// Shown before the ticket call starts.
pub const CREATING_TICKET: &str = "Creating a support ticket for you now...";

/// Shown when the backend confirms a ticket without a message of its own.
pub const TICKET_CREATED: &str = "We've created a ticket and our team will get back to you at your provided email. Is there anything else I can help with?";

/// Shown when a ticket call fails.
pub const TICKET_FAILED: &str =
    "I'm sorry, I couldn't create a ticket at this time. Please try again later.";
