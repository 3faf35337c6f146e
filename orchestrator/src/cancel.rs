//! Cancellation for a single workflow invocation
//!
//! Every blocking step of the workflow (status queries, scheduled-creation
//! waits, the build call) is raced against a [`Cancellation`]. It fires when
//! the paired [`CancelHandle`] is triggered or the optional deadline passes.

use std::fmt;
use std::future::{Future, pending};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Why a workflow stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Requested,
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Requested => f.write_str("cancelled by caller"),
            CancelReason::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Trigger side of a cancellation signal
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // send_replace succeeds even when every receiver is gone
        self.sender.send_replace(true);
    }
}

/// Observer side, cheap to clone
#[derive(Debug, Clone)]
pub struct Cancellation {
    signal: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// Linked handle and cancellation
    pub fn new() -> (CancelHandle, Self) {
        let (sender, receiver) = watch::channel(false);
        (
            CancelHandle { sender },
            Self {
                signal: Some(receiver),
                deadline: None,
            },
        )
    }

    /// A cancellation that only fires on its deadline, if one is added
    pub fn never() -> Self {
        Self {
            signal: None,
            deadline: None,
        }
    }

    /// Fire once `timeout` has elapsed from now
    pub fn with_deadline(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Non-blocking check
    pub fn check(&self) -> Option<CancelReason> {
        if self.signal.as_ref().is_some_and(|signal| *signal.borrow()) {
            return Some(CancelReason::Requested);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves when the invocation is cancelled; pends forever otherwise
    pub async fn cancelled(&self) -> CancelReason {
        let requested = async {
            match self.signal.clone() {
                Some(mut signal) => loop {
                    if *signal.borrow_and_update() {
                        break;
                    }
                    if signal.changed().await.is_err() {
                        // Handle dropped without cancelling
                        pending::<()>().await;
                    }
                },
                None => pending::<()>().await,
            }
        };
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            _ = requested => CancelReason::Requested,
            _ = deadline => CancelReason::DeadlineExceeded,
        }
    }

    /// Run `future` unless cancellation wins the race
    pub async fn run<F>(&self, future: F) -> Result<F::Output, CancelReason>
    where
        F: Future,
    {
        if let Some(reason) = self.check() {
            return Err(reason);
        }
        tokio::select! {
            biased;
            reason = self.cancelled() => Err(reason),
            output = future => Ok(output),
        }
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::never()
    }
}
