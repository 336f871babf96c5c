//! Backend side of the widget.
//!
//! [`BackendGateway`] is the seam between the conversation logic and the
//! question-answering service. [`HttpGateway`] is the production
//! implementation, speaking JSON over HTTP POST.

use crate::config::{ConfigError, WidgetConfig};
use crate::messages;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wire value of `status` that means the backend could not answer.
pub const HUMAN_HANDOFF_STATUS: &str = "human_handoff";

/// Whether the backend was able to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerStatus {
    /// The answer stands on its own.
    #[default]
    Answered,
    /// The backend couldn't answer and suggests a human hand-off.
    HumanHandoff,
}

impl AnswerStatus {
    /// Interpret the optional wire `status` field.
    pub fn from_wire(status: Option<&str>) -> Self {
        match status {
            Some(HUMAN_HANDOFF_STATUS) => Self::HumanHandoff,
            _ => Self::Answered,
        }
    }
}

/// Result of asking a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskResult {
    /// Text to show the user.
    pub answer: String,
    /// Whether a hand-off should be offered.
    pub status: AnswerStatus,
}

impl AskResult {
    /// A normal answer.
    pub fn answered(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            status: AnswerStatus::Answered,
        }
    }

    /// An answer that asks for a human hand-off.
    pub fn handoff(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            status: AnswerStatus::HumanHandoff,
        }
    }

    /// Check if the backend signalled that it could not answer.
    pub fn needs_handoff(&self) -> bool {
        self.status == AnswerStatus::HumanHandoff
    }
}

/// Result of creating a support ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketResult {
    /// Confirmation text from the backend, shown verbatim when present.
    pub message: Option<String>,
}

impl TicketResult {
    /// Text to show the user: the backend's message, or a fixed confirmation
    /// when it sent none or only whitespace.
    pub fn confirmation(&self) -> &str {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(messages::TICKET_CREATED)
    }
}

/// Something that can answer questions and open tickets.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Ask the backend a question.
    async fn ask(&self, question: &str) -> Result<AskResult, GatewayError>;

    /// Open a support ticket for an unanswered question.
    async fn create_ticket(&self, question: &str, email: &str)
        -> Result<TicketResult, GatewayError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AskRequest<'a> {
    question: &'a str,
    client_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TicketRequest<'a> {
    question: &'a str,
    email: &'a str,
    client_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    answer: Option<String>,
    status: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TicketResponse {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// [`BackendGateway`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    client_id: String,
    ask_url: String,
    ticket_url: String,
    health_url: String,
}

impl HttpGateway {
    /// Build a gateway from a validated configuration.
    pub fn new(config: &WidgetConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            client,
            client_id: config.client_id()?.to_string(),
            ask_url: config.ask_url(),
            ticket_url: config.ticket_url(),
            health_url: config.health_url(),
        })
    }

    /// The client identifier attached to every request.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Check that the backend is reachable.
    pub async fn health(&self) -> Result<(), GatewayError> {
        let response = self
            .client
            .get(&self.health_url)
            .send()
            .await
            .map_err(GatewayError::Transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(GatewayError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Health check failed").into(),
            })
        }
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(GatewayError::Transport)?;

        let status = response.status();
        let text = response.text().await.map_err(GatewayError::Transport)?;
        debug!(url, status = status.as_u16(), "backend responded");

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("API Error").into());
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| GatewayError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn ask(&self, question: &str) -> Result<AskResult, GatewayError> {
        let body = AskRequest {
            question,
            client_id: &self.client_id,
        };
        let response: AskResponse = self.post_json(&self.ask_url, &body).await?;

        if let Some(error) = response.error {
            return Err(GatewayError::Backend(error));
        }
        let answer = response
            .answer
            .ok_or_else(|| GatewayError::Malformed("response has no `answer` field".into()))?;

        Ok(AskResult {
            answer,
            status: AnswerStatus::from_wire(response.status.as_deref()),
        })
    }

    async fn create_ticket(
        &self,
        question: &str,
        email: &str,
    ) -> Result<TicketResult, GatewayError> {
        let body = TicketRequest {
            question,
            email,
            client_id: &self.client_id,
        };
        let response: TicketResponse = self.post_json(&self.ticket_url, &body).await?;

        if let Some(error) = response.error {
            return Err(GatewayError::Backend(error));
        }
        Ok(TicketResult {
            message: response.message,
        })
    }
}

/// Errors from a backend call. All of them are recovered by the controller.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Non-2xx HTTP status.
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// 2xx response carrying an `error` field.
    #[error("backend error: {0}")]
    Backend(String),

    /// Response body could not be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),
}
