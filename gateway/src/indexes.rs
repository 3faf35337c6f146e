//! Query service index endpoints

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use shared::{BuildBatch, ClusterRef, IndexLocation, IndexStatus};
use crate::client::ApiClient;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::traits::IndexGateway;

/// Body of `GET .../queryService/indexBuildStatus/{index}`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexBuildStatusResponse {
    pub status: String,
}

/// Body of `POST .../queryService/indexes`
#[derive(Debug, Serialize)]
pub struct IndexDefinition {
    pub definition: String,
}

/// Response of `POST .../queryService/indexes`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexBuildResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Real gateway backed by the Capella v4 API
#[derive(Debug, Clone)]
pub struct RealIndexGateway {
    client: ApiClient,
}

impl RealIndexGateway {
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
        })
    }

    fn query_service_path<'a>(cluster: &'a ClusterRef, tail: &[&'a str]) -> Vec<&'a str> {
        let mut segments = vec![
            "v4",
            "organizations",
            cluster.organization_id.as_str(),
            "projects",
            cluster.project_id.as_str(),
            "clusters",
            cluster.cluster_id.as_str(),
            "queryService",
        ];
        segments.extend_from_slice(tail);
        segments
    }
}

#[async_trait]
impl IndexGateway for RealIndexGateway {
    async fn index_build_status(&self, location: &IndexLocation) -> GatewayResult<IndexStatus> {
        let segments = Self::query_service_path(
            &location.cluster,
            &["indexBuildStatus", location.index_name.as_str()],
        );
        let url = self.client.endpoint(segments)?;
        let keyspace = &location.keyspace;
        let query = [
            ("bucket", keyspace.bucket.as_str()),
            ("scope", keyspace.scope.as_str()),
            ("collection", keyspace.collection.as_str()),
        ];

        let response: IndexBuildStatusResponse = self
            .client
            .get(url, &query)
            .await?
            .ok_or_else(|| GatewayError::decode("empty index build status response"))?;

        debug!(index = %location.index_name, status = %response.status, "Fetched index build status");
        Ok(IndexStatus::from(response.status))
    }

    async fn build_indexes(&self, cluster: &ClusterRef, batch: &BuildBatch) -> GatewayResult<()> {
        let url = self
            .client
            .endpoint(Self::query_service_path(cluster, &["indexes"]))?;
        let body = IndexDefinition {
            definition: batch.statement(),
        };

        info!(cluster = %cluster, statement = %body.definition, "Submitting build statement");
        let response: Option<IndexBuildResponse> = self.client.post(url, &body).await?;

        match response.and_then(|r| r.error).filter(|e| !e.is_empty()) {
            Some(message) => Err(GatewayError::Rejected { message }),
            None => Ok(()),
        }
    }
}
