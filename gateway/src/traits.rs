//! Gateway trait definitions for dependency injection

use async_trait::async_trait;
use reqwest::RequestBuilder;

use shared::{BuildBatch, ClusterRef, IndexLocation, IndexStatus};
use crate::error::GatewayResult;

/// Applies credentials to an outgoing request
///
/// Implementations must leave the request untouched when they hold no
/// credentials.
pub trait Authenticator: Send + Sync + std::fmt::Debug {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Remote indexing service operations used by the build orchestrator
#[mockall::automock]
#[async_trait]
pub trait IndexGateway: Send + Sync {
    /// Fetch the current build status of a single index
    async fn index_build_status(&self, location: &IndexLocation) -> GatewayResult<IndexStatus>;

    /// Submit one `BUILD INDEX` statement covering every index in the batch
    async fn build_indexes(&self, cluster: &ClusterRef, batch: &BuildBatch) -> GatewayResult<()>;
}
