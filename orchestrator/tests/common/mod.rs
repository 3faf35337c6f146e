//! Common test utilities and infrastructure
//!
//! Shared fixtures and a scripted gateway used by the orchestrator test suites.

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{Reply, ScriptedGateway, TestHelpers};
