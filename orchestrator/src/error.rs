//! Orchestrator-specific error types

use std::time::Duration;
use thiserror::Error;

use gateway::GatewayError;
use shared::SharedError;

use crate::cancel::CancelReason;

/// Coarse classification callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Remote,
    Decode,
    Configuration,
    Cancellation,
    Timeout,
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] SharedError),

    #[error("Cannot get index build status for index {index}: {source}")]
    StatusQuery { index: String, source: GatewayError },

    #[error("Cannot wait for scheduled index creation for index {index}: {source}")]
    WaitForScheduled { index: String, source: GatewayError },

    #[error("Index {index} still scheduled for creation after {waited:?} ({polls} polls)")]
    WaitTimeout { index: String, waited: Duration, polls: u32 },

    #[error("Cannot build deferred indexes [{}]: {source}", .indexes.join(", "))]
    Build { indexes: Vec<String>, source: GatewayError },

    #[error("Workflow cancelled: {reason}")]
    Cancelled { reason: CancelReason },
}

impl WorkflowError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } | Self::InvalidRequest(_) => ErrorKind::Configuration,
            Self::StatusQuery { source, .. }
            | Self::WaitForScheduled { source, .. }
            | Self::Build { source, .. } => gateway_kind(source),
            Self::WaitTimeout { .. } => ErrorKind::Timeout,
            Self::Cancelled { .. } => ErrorKind::Cancellation,
        }
    }

    /// Cancellation means "try again later", not "broken"
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Index the failure is attributed to, when there is exactly one
    pub fn index(&self) -> Option<&str> {
        match self {
            Self::StatusQuery { index, .. }
            | Self::WaitForScheduled { index, .. }
            | Self::WaitTimeout { index, .. } => Some(index),
            _ => None,
        }
    }
}

fn gateway_kind(error: &GatewayError) -> ErrorKind {
    match error {
        GatewayError::Transport { .. } => ErrorKind::Transport,
        GatewayError::Remote { .. }
        | GatewayError::UnexpectedStatus { .. }
        | GatewayError::Rejected { .. } => ErrorKind::Remote,
        GatewayError::Decode { .. } => ErrorKind::Decode,
        GatewayError::Configuration { .. } => ErrorKind::Configuration,
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
