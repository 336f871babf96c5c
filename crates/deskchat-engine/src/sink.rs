//! Display side of the widget.
//!
//! The controller never touches a screen directly. It writes lines through a
//! [`MessageSink`], which a host implements for whatever it renders into.
//! [`Transcript`] is an in-memory sink that records what would be shown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Who a displayed message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Echo of what the user typed.
    User,
    /// Widget or backend output.
    Bot,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bot => write!(f, "bot"),
        }
    }
}

/// Display options for a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShowOptions {
    /// Render a typing placeholder instead of the text.
    pub loading: bool,
}

impl ShowOptions {
    /// Options for a typing placeholder.
    pub fn loading() -> Self {
        Self { loading: true }
    }
}

/// Handle to a displayed message.
///
/// Not `Clone`: [`MessageSink::remove`] takes the handle by value, so a
/// placeholder is removed at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct MessageHandle {
    id: u64,
}

impl MessageHandle {
    /// Wrap a sink-assigned message id.
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    /// The sink-assigned message id.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Something that can append lines to a visible transcript.
///
/// Implementations are called from the controller's completion tasks, so
/// they must be shareable across threads.
pub trait MessageSink: Send + Sync {
    /// Append a message and return a handle to it.
    fn show(&self, text: &str, origin: Origin, opts: ShowOptions) -> MessageHandle;

    /// Remove a previously shown message.
    fn remove(&self, handle: MessageHandle);
}

/// A recorded transcript line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Sink-assigned id, matching the returned [`MessageHandle`].
    pub id: u64,
    /// Message author.
    pub origin: Origin,
    /// Message text (empty for placeholders).
    pub text: String,
    /// Whether this is a typing placeholder.
    pub loading: bool,
    /// When the message was shown.
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct TranscriptInner {
    next_id: u64,
    entries: Vec<TranscriptEntry>,
    removed: usize,
}

/// In-memory [`MessageSink`].
#[derive(Debug, Default)]
pub struct Transcript {
    inner: Mutex<TranscriptInner>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TranscriptInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the visible entries, oldest first.
    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.lock().entries.clone()
    }

    /// Texts of visible messages from the given origin, oldest first.
    pub fn texts(&self, origin: Origin) -> Vec<String> {
        self.lock()
            .entries
            .iter()
            .filter(|e| e.origin == origin && !e.loading)
            .map(|e| e.text.clone())
            .collect()
    }

    /// Texts of visible bot messages, oldest first.
    pub fn bot_texts(&self) -> Vec<String> {
        self.texts(Origin::Bot)
    }

    /// Texts of echoed user messages, oldest first.
    pub fn user_texts(&self) -> Vec<String> {
        self.texts(Origin::User)
    }

    /// The most recent visible bot message.
    pub fn last_bot_text(&self) -> Option<String> {
        self.bot_texts().pop()
    }

    /// Number of placeholders still visible.
    pub fn loading_count(&self) -> usize {
        self.lock().entries.iter().filter(|e| e.loading).count()
    }

    /// Number of successful `remove` calls so far.
    pub fn removed_count(&self) -> usize {
        self.lock().removed
    }

    /// Number of visible entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}

impl MessageSink for Transcript {
    fn show(&self, text: &str, origin: Origin, opts: ShowOptions) -> MessageHandle {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.entries.push(TranscriptEntry {
            id,
            origin,
            text: if opts.loading {
                String::new()
            } else {
                text.to_string()
            },
            loading: opts.loading,
            timestamp: Utc::now(),
        });
        MessageHandle::new(id)
    }

    fn remove(&self, handle: MessageHandle) {
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|e| e.id != handle.id());
        if inner.entries.len() < before {
            inner.removed += 1;
        }
    }
}
