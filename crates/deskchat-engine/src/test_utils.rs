//! Test doubles for controller tests.

use crate::conversation::ConversationController;
use crate::gateway::{AskResult, BackendGateway, GatewayError, TicketResult};
use crate::sink::{MessageHandle, MessageSink, Origin, ShowOptions, Transcript};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

/// A [`BackendGateway`] that replays scripted replies and records calls.
#[derive(Default)]
pub struct ScriptedGateway {
    asks: Mutex<VecDeque<Result<AskResult, GatewayError>>>,
    tickets: Mutex<VecDeque<Result<TicketResult, GatewayError>>>,
    asked: Mutex<Vec<String>>,
    ticket_calls: Mutex<Vec<(String, String)>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(self, result: AskResult) -> Self {
        self.asks.lock().unwrap().push_back(Ok(result));
        self
    }

    pub fn with_ask_error(self, error: GatewayError) -> Self {
        self.asks.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn with_ticket(self, message: Option<&str>) -> Self {
        self.tickets.lock().unwrap().push_back(Ok(TicketResult {
            message: message.map(str::to_string),
        }));
        self
    }

    pub fn with_ticket_error(self, error: GatewayError) -> Self {
        self.tickets.lock().unwrap().push_back(Err(error));
        self
    }

    /// Hold every call until a permit is added to `gate`.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    pub fn ticket_calls(&self) -> Vec<(String, String)> {
        self.ticket_calls.lock().unwrap().clone()
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

#[async_trait]
impl BackendGateway for ScriptedGateway {
    async fn ask(&self, question: &str) -> Result<AskResult, GatewayError> {
        self.asked.lock().unwrap().push(question.to_string());
        self.wait_for_gate().await;
        self.asks
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Malformed("no scripted answer".into())))
    }

    async fn create_ticket(
        &self,
        question: &str,
        email: &str,
    ) -> Result<TicketResult, GatewayError> {
        self.ticket_calls
            .lock()
            .unwrap()
            .push((question.to_string(), email.to_string()));
        self.wait_for_gate().await;
        self.tickets
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Malformed("no scripted ticket".into())))
    }
}

/// A controller wired to a [`Transcript`] and the given gateway.
pub fn create_test_controller(
    gateway: ScriptedGateway,
) -> (ConversationController, Arc<Transcript>, Arc<ScriptedGateway>) {
    let transcript = Arc::new(Transcript::new());
    let gateway = Arc::new(gateway);
    let sink: Arc<dyn MessageSink> = transcript.clone();
    let backend: Arc<dyn BackendGateway> = gateway.clone();
    (ConversationController::new(sink, backend), transcript, gateway)
}

/// A sink that stalls the showing thread right after a given text appears.
///
/// `shown` is notified once the text is recorded, then the caller sleeps for
/// `stall`. Run on a multi-thread runtime so the test body keeps going while
/// the backend task is stuck inside `show`.
pub struct StallingSink {
    transcript: Arc<Transcript>,
    trigger: String,
    stall: Duration,
    shown: Arc<Notify>,
}

impl StallingSink {
    pub fn new(transcript: Arc<Transcript>, trigger: &str, stall: Duration) -> Self {
        Self {
            transcript,
            trigger: trigger.to_string(),
            stall,
            shown: Arc::new(Notify::new()),
        }
    }

    pub fn shown(&self) -> Arc<Notify> {
        Arc::clone(&self.shown)
    }
}

impl MessageSink for StallingSink {
    fn show(&self, text: &str, origin: Origin, opts: ShowOptions) -> MessageHandle {
        let handle = self.transcript.show(text, origin, opts);
        if text == self.trigger {
            self.shown.notify_one();
            std::thread::sleep(self.stall);
        }
        handle
    }

    fn remove(&self, handle: MessageHandle) {
        self.transcript.remove(handle);
    }
}

/// A controller that shows through a [`StallingSink`] triggered by `trigger`.
pub fn create_stalling_controller(
    gateway: ScriptedGateway,
    trigger: &str,
) -> (
    ConversationController,
    Arc<Transcript>,
    Arc<ScriptedGateway>,
    Arc<Notify>,
) {
    let transcript = Arc::new(Transcript::new());
    let stalling = StallingSink::new(Arc::clone(&transcript), trigger, Duration::from_millis(200));
    let shown = stalling.shown();
    let gateway = Arc::new(gateway);
    let backend: Arc<dyn BackendGateway> = gateway.clone();
    let controller = ConversationController::new(Arc::new(stalling), backend);
    (controller, transcript, gateway, shown)
}

/// A 503 from the backend.
pub fn unavailable() -> GatewayError {
    GatewayError::Status {
        status: 503,
        message: "Service Unavailable".into(),
    }
}
