//! Orchestration of deferred index builds on Capella clusters
//!
//! The [`BuildOrchestrator`] checks the build status of each requested index
//! through an [`IndexGateway`](gateway::IndexGateway), waits for indexes that
//! are still being created and submits a single `BUILD INDEX` statement for
//! everything that is ready. Progress is streamed through a
//! [`ProgressReporter`] and every remote call can be interrupted through a
//! [`Cancellation`].

pub mod cancel;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod types;

// Re-export commonly used types
pub use cancel::{CancelHandle, CancelReason, Cancellation};
pub use error::{ErrorKind, WorkflowError, WorkflowResult};
pub use orchestrator::BuildOrchestrator;
pub use progress::ProgressReporter;
pub use types::{BuildIndexRequest, BuildOutcome, ResolvedRequest, SkippedIndex, WorkflowConfig};
