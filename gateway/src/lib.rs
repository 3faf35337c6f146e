//! API gateway for the Capella query service
//!
//! Translates index build intents into HTTP calls: URL construction,
//! authentication, bounded retries with exponential backoff and error
//! decoding all live here so the orchestrator only sees typed results.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod indexes;
pub mod traits;

#[cfg(test)]
mod tests;

pub use auth::{ApiKeySecretAuth, BearerTokenAuth};
pub use client::ApiClient;
pub use config::{GatewayConfig, RetryPolicy, Settings};
pub use error::{ApiErrorBody, GatewayError, GatewayResult};
pub use indexes::RealIndexGateway;
pub use traits::*;
