//! Progress reporting back to the caller

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::info;

use shared::ProgressEvent;

/// Emits ordered progress events over an unbounded channel
///
/// Events are observational. A caller that drops its receiver does not
/// affect the workflow; the lines still reach the log.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    sender: Option<mpsc::UnboundedSender<ProgressEvent>>,
    sequence: Arc<AtomicU64>,
}

impl ProgressReporter {
    /// Reporter plus the receiving end for the caller
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let reporter = Self {
            sender: Some(tx),
            sequence: Arc::new(AtomicU64::new(0)),
        };
        (reporter, rx)
    }

    /// Reporter that only logs
    pub fn silent() -> Self {
        Self {
            sender: None,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn report(&self, message: impl Into<String>) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let event = ProgressEvent::new(sequence, message);
        info!(sequence, "📋 {}", event.message);

        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }
}
