//! Test fixtures and data for orchestrator tests

use std::time::Duration;

use orchestrator::{BuildIndexRequest, WorkflowConfig};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Standard cluster coordinates
    pub const ORGANIZATION: &'static str = "org-1";
    pub const PROJECT: &'static str = "proj-1";
    pub const CLUSTER: &'static str = "cluster-1";

    /// Standard keyspace
    pub const BUCKET: &'static str = "travel";
    pub const SCOPE: &'static str = "inventory";
    pub const COLLECTION: &'static str = "airline";

    /// Request on the default scope and collection of the test bucket
    pub fn default_namespace_request(indexes: &[&str]) -> BuildIndexRequest {
        BuildIndexRequest::new(Self::ORGANIZATION, Self::PROJECT, Self::CLUSTER, Self::BUCKET)
            .with_indexes(indexes.iter().copied())
    }

    /// Request on the fully named test keyspace
    pub fn request(indexes: &[&str]) -> BuildIndexRequest {
        Self::default_namespace_request(indexes)
            .with_scope(Self::SCOPE)
            .with_collection(Self::COLLECTION)
    }

    /// Polling fast enough that scheduled waits finish in milliseconds
    pub fn fast_config() -> WorkflowConfig {
        WorkflowConfig {
            poll_interval: Duration::from_millis(5),
            max_wait: Duration::from_secs(5),
        }
    }

    /// Polling that never gets a second look within a test
    pub fn slow_config() -> WorkflowConfig {
        WorkflowConfig {
            poll_interval: Duration::from_secs(30),
            max_wait: Duration::from_secs(600),
        }
    }
}
