//! Configuration types for the deskchat widget.
//!
//! This module defines the configuration schema a host reads before starting
//! a widget: the client identifier attached to every backend request, the
//! backend location, and presentation settings.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a single widget instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Opaque client identifier sent with every backend request.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Base URL of the question-answering backend.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Path of the ask endpoint, relative to `api_base_url`.
    #[serde(default = "default_ask_path")]
    pub ask_path: String,

    /// Path of the ticket endpoint, relative to `api_base_url`.
    #[serde(default = "default_ticket_path")]
    pub ticket_path: String,

    /// Title shown in the widget header.
    #[serde(default = "default_title")]
    pub title: String,

    /// Greeting shown when the widget starts. `None` starts silently.
    #[serde(default = "default_greeting")]
    pub greeting: Option<String>,
}

fn default_api_base_url() -> String {
    "http://localhost:5000".into()
}

fn default_ask_path() -> String {
    "/ask".into()
}

fn default_ticket_path() -> String {
    "/create_ticket".into()
}

fn default_title() -> String {
    "AI Assistant".into()
}

#[allow(clippy::unnecessary_wraps)]
fn default_greeting() -> Option<String> {
    Some("Hello! How can I help you today?".into())
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            api_base_url: default_api_base_url(),
            ask_path: default_ask_path(),
            ticket_path: default_ticket_path(),
            title: default_title(),
            greeting: default_greeting(),
        }
    }
}

impl WidgetConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration from a file, falling back to defaults when it doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Apply command-line overrides on top of the loaded values.
    #[must_use]
    pub fn with_overrides(mut self, client_id: Option<String>, api_base_url: Option<String>) -> Self {
        if client_id.is_some() {
            self.client_id = client_id;
        }
        if let Some(url) = api_base_url {
            self.api_base_url = url;
        }
        self
    }

    /// The client identifier, or [`ConfigError::MissingClientId`] if it is absent or blank.
    pub fn client_id(&self) -> Result<&str, ConfigError> {
        self.client_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingClientId)
    }

    /// Check that the widget can start with this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.client_id()?;
        reqwest::Url::parse(&self.api_base_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.api_base_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// Full URL of the ask endpoint.
    pub fn ask_url(&self) -> String {
        join_url(&self.api_base_url, &self.ask_path)
    }

    /// Full URL of the ticket endpoint.
    pub fn ticket_url(&self) -> String {
        join_url(&self.api_base_url, &self.ticket_path)
    }

    /// Full URL of the backend health endpoint.
    pub fn health_url(&self) -> String {
        join_url(&self.api_base_url, "/health")
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No client identifier was supplied; the widget must not start.
    #[error("client_id is missing from the widget configuration")]
    MissingClientId,

    /// The backend base URL could not be parsed.
    #[error("invalid api_base_url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}
