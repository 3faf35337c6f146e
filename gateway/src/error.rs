//! Gateway error types

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors surfaced by the index API gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Transport error during {operation}: {message}")]
    Transport { operation: String, message: String },

    #[error("{message} (status {status})")]
    Remote { status: u16, message: String },

    #[error("capella api request failed: status {status}, body: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Request rejected by remote service: {message}")]
    Rejected { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl GatewayError {
    pub fn transport(operation: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn decode(message: impl fmt::Display) -> Self {
        Self::Decode {
            message: message.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Turn a non-2xx response into an error, preferring the structured body
    pub fn from_status(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(api_error) if api_error.has_content() => Self::Remote {
                status,
                message: api_error.to_string(),
            },
            _ => Self::UnexpectedStatus {
                status,
                body: body.to_string(),
            },
        }
    }

    /// HTTP status of the failed exchange, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } | Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error payload returned by the Capella v4 API
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    /// Usually a string; some endpoints send a numeric code
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ApiErrorBody {
    fn has_content(&self) -> bool {
        self.code_text().is_some() || non_empty(&self.message).is_some()
    }

    fn code_text(&self) -> Option<String> {
        match self.code.as_ref()? {
            serde_json::Value::String(code) if !code.is_empty() => Some(code.clone()),
            serde_json::Value::Number(code) => Some(code.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code_text(), non_empty(&self.message)) {
            (Some(code), Some(message)) => write!(f, "{code}: {message}"),
            (Some(code), None) => f.write_str(&code),
            (None, Some(message)) => f.write_str(message),
            (None, None) => f.write_str("capella api error"),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
