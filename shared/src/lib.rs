//! Shared types for the deferred index build workspace
//!
//! Holds the value types passed between the API gateway and the build
//! orchestrator, the shared error type and tracing setup.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
