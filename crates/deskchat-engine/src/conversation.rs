//! Conversation controller for a widget instance.
//!
//! The controller owns the [`ConversationState`] and decides, for every line
//! the user types, whether it is a question for the backend or a reply in
//! the support-ticket hand-off. It talks to the outside world only through a
//! [`MessageSink`] and a [`BackendGateway`], so it runs the same way in a
//! terminal, a test, or any other host.
//!
//! Backend calls run as spawned tokio tasks. Input is always routed by the
//! state at the time it is typed; a task only updates the state once its call
//! settles. Calls are never cancelled, so if two calls overlap their replies
//! are appended in completion order.

use crate::config::{ConfigError, WidgetConfig};
use crate::gateway::{BackendGateway, HttpGateway};
use crate::intent::{self, Confirmation, EmailReply};
use crate::messages;
use crate::sink::{MessageSink, Origin, ShowOptions};
use crate::state::ConversationState;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of [`ConversationController::handle_input`].
#[derive(Debug)]
pub enum Turn {
    /// Blank input; nothing was shown and the state is unchanged.
    Ignored,
    /// Fully handled without a backend call.
    Settled,
    /// A backend call is running; its reply is shown when it settles.
    Pending(JoinHandle<()>),
}

impl Turn {
    /// Check if a backend call was started.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Check if the turn has nothing left to do.
    pub fn is_finished(&self) -> bool {
        match self {
            Self::Pending(handle) => handle.is_finished(),
            Self::Ignored | Self::Settled => true,
        }
    }

    /// Wait for the backend call, if any, to settle.
    pub async fn settle(self) {
        if let Self::Pending(handle) = self {
            if let Err(e) = handle.await {
                warn!(error = %e, "backend task did not complete");
            }
        }
    }
}

/// Drives one widget's conversation.
pub struct ConversationController {
    session_id: String,
    state: Arc<watch::Sender<ConversationState>>,
    sink: Arc<dyn MessageSink>,
    gateway: Arc<dyn BackendGateway>,
    greeting: Option<String>,
}

impl ConversationController {
    /// Create a controller in the `Idle` state.
    pub fn new(sink: Arc<dyn MessageSink>, gateway: Arc<dyn BackendGateway>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            state: Arc::new(watch::Sender::new(ConversationState::Idle)),
            sink,
            gateway,
            greeting: None,
        }
    }

    /// Create a controller backed by [`HttpGateway`].
    ///
    /// Fails without showing anything if the configuration has no client id.
    pub fn from_config(
        config: &WidgetConfig,
        sink: Arc<dyn MessageSink>,
    ) -> Result<Self, ConfigError> {
        let gateway = HttpGateway::new(config)?;
        Ok(Self::new(sink, Arc::new(gateway)).with_greeting(config.greeting.clone()))
    }

    /// Set the message shown by [`greet`](Self::greet).
    #[must_use]
    pub fn with_greeting(mut self, greeting: Option<String>) -> Self {
        self.greeting = greeting;
        self
    }

    /// Unique id of this conversation, used in log fields.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    ///
    /// The receiver is marked changed on every transition, including those
    /// made by backend tasks after their call settles.
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }

    /// Show the configured greeting, if any.
    pub fn greet(&self) {
        if let Some(greeting) = &self.greeting {
            self.say(greeting);
        }
    }

    /// Handle one line of user input.
    ///
    /// Blank input is ignored. Otherwise the trimmed text is echoed and
    /// dispatched on the current state. Must be called from within a tokio
    /// runtime, since backend calls are spawned onto it.
    pub fn handle_input(&self, text: &str) -> Turn {
        let text = text.trim();
        if text.is_empty() {
            return Turn::Ignored;
        }

        self.sink.show(text, Origin::User, ShowOptions::default());

        match self.state() {
            ConversationState::Idle => self.ask(text),
            ConversationState::AwaitingHandoffConfirmation { question } => {
                self.confirm_handoff(text, question);
                Turn::Settled
            }
            ConversationState::AwaitingEmail { question } => self.collect_email(text, question),
        }
    }

    fn say(&self, text: &str) {
        self.sink.show(text, Origin::Bot, ShowOptions::default());
    }

    fn transition(&self, next: ConversationState) {
        set_state(&self.state, next, &self.session_id);
    }

    fn ask(&self, question: &str) -> Turn {
        let loading = self.sink.show("", Origin::Bot, ShowOptions::loading());

        let question = question.to_string();
        let sink = Arc::clone(&self.sink);
        let gateway = Arc::clone(&self.gateway);
        let state = Arc::clone(&self.state);
        let session_id = self.session_id.clone();

        Turn::Pending(tokio::spawn(async move {
            let outcome = gateway.ask(&question).await;
            sink.remove(loading);

            match outcome {
                Ok(result) => {
                    sink.show(&result.answer, Origin::Bot, ShowOptions::default());
                    if result.needs_handoff() {
                        // A reply to the prompt must already see the new state.
                        set_state(
                            &state,
                            ConversationState::AwaitingHandoffConfirmation { question },
                            &session_id,
                        );
                        sink.show(messages::HANDOFF_PROMPT, Origin::Bot, ShowOptions::default());
                    }
                }
                Err(error) => {
                    warn!(session_id = %session_id, error = %error, "ask failed");
                    sink.show(messages::CONNECTION_FAILURE, Origin::Bot, ShowOptions::default());
                }
            }
        }))
    }

    fn confirm_handoff(&self, text: &str, question: String) {
        match intent::classify_confirmation(text) {
            Ok(Confirmation::Affirmative) => {
                self.transition(ConversationState::AwaitingEmail { question });
                self.say(messages::EMAIL_REQUEST);
            }
            Ok(Confirmation::Negative) => {
                self.transition(ConversationState::Idle);
                self.say(messages::HANDOFF_DECLINED);
            }
            Err(e) => {
                debug!(session_id = %self.session_id, reason = %e, "re-prompting");
                self.say(messages::CONFIRMATION_REPROMPT);
            }
        }
    }

    fn collect_email(&self, text: &str, question: String) -> Turn {
        let email = match intent::parse_email_reply(text) {
            Ok(EmailReply::Cancel) => {
                self.transition(ConversationState::Idle);
                self.say(messages::TICKET_CANCELLED);
                return Turn::Settled;
            }
            Ok(EmailReply::Address(email)) => email.to_string(),
            Err(e) => {
                debug!(session_id = %self.session_id, reason = %e, "re-prompting");
                self.say(messages::INVALID_EMAIL);
                return Turn::Settled;
            }
        };

        self.say(messages::CREATING_TICKET);

        let sink = Arc::clone(&self.sink);
        let gateway = Arc::clone(&self.gateway);
        let state = Arc::clone(&self.state);
        let session_id = self.session_id.clone();

        Turn::Pending(tokio::spawn(async move {
            let outcome = gateway.create_ticket(&question, &email).await;
            // Back to Idle whatever the outcome, before the user sees it.
            set_state(&state, ConversationState::Idle, &session_id);

            match outcome {
                Ok(ticket) => {
                    info!(session_id = %session_id, "support ticket created");
                    sink.show(ticket.confirmation(), Origin::Bot, ShowOptions::default());
                }
                Err(error) => {
                    warn!(session_id = %session_id, error = %error, "ticket creation failed");
                    sink.show(messages::TICKET_FAILED, Origin::Bot, ShowOptions::default());
                }
            }
        }))
    }
}

impl std::fmt::Debug for ConversationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationController")
            .field("session_id", &self.session_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn set_state(state: &watch::Sender<ConversationState>, next: ConversationState, session_id: &str) {
    state.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        debug!(
            session_id,
            from = current.display_name(),
            to = next.display_name(),
            question = next.pending_question(),
            "state transition"
        );
        *current = next;
        true
    });
}
