//! Request, configuration and outcome types for the build workflow

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use shared::{ClusterRef, IndexLocation, IndexStatus, Keyspace};
use crate::error::{WorkflowError, WorkflowResult};

/// Caller supplied description of the indexes to build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildIndexRequest {
    pub organization_id: String,
    pub project_id: String,
    pub cluster_id: String,
    pub bucket_name: String,
    pub scope_name: Option<String>,
    pub collection_name: Option<String>,
    pub index_names: Vec<String>,
}

impl BuildIndexRequest {
    pub fn new(
        organization_id: impl Into<String>,
        project_id: impl Into<String>,
        cluster_id: impl Into<String>,
        bucket_name: impl Into<String>,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            project_id: project_id.into(),
            cluster_id: cluster_id.into(),
            bucket_name: bucket_name.into(),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope_name = Some(scope.into());
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection_name = Some(collection.into());
        self
    }

    pub fn with_indexes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Validate coordinates, apply scope/collection defaults and de-duplicate names
    pub fn resolve(self) -> WorkflowResult<ResolvedRequest> {
        let cluster = ClusterRef::new(self.organization_id, self.project_id, self.cluster_id);
        cluster.validate()?;

        let keyspace = Keyspace::with_defaults(self.bucket_name, self.scope_name, self.collection_name);
        keyspace.validate()?;

        if self.index_names.is_empty() {
            return Err(WorkflowError::config("index_names must contain at least one index"));
        }

        let mut index_names: Vec<String> = Vec::with_capacity(self.index_names.len());
        for name in self.index_names {
            if name.trim().is_empty() {
                return Err(WorkflowError::config("index_names must not contain blank names"));
            }
            if index_names.contains(&name) {
                warn!(index = %name, "Ignoring duplicate index name");
                continue;
            }
            index_names.push(name);
        }

        Ok(ResolvedRequest {
            cluster,
            keyspace,
            index_names,
        })
    }
}

/// Validated request with defaults applied; immutable for the rest of the run
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub cluster: ClusterRef,
    pub keyspace: Keyspace,
    pub index_names: Vec<String>,
}

impl ResolvedRequest {
    pub fn location(&self, index_name: &str) -> IndexLocation {
        IndexLocation::new(self.cluster.clone(), self.keyspace.clone(), index_name)
    }
}

/// Polling behaviour while an index is scheduled for creation
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(600),
        }
    }
}

/// Index left out of the build batch, with the status that kept it out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedIndex {
    pub name: String,
    pub status: IndexStatus,
}

/// Successful workflow result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildOutcome {
    /// Indexes submitted in the build statement, in first-observed order
    pub built: Vec<String>,
    pub skipped: Vec<SkippedIndex>,
}

impl BuildOutcome {
    pub fn nothing_to_build(&self) -> bool {
        self.built.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::DEFAULT_NAMESPACE;

    fn request() -> BuildIndexRequest {
        BuildIndexRequest::new("org", "proj", "cluster", "bucket")
    }

    #[test]
    fn test_resolve_applies_default_namespace() {
        let resolved = request().with_indexes(["idx1"]).resolve().unwrap();

        assert_eq!(resolved.keyspace.scope, DEFAULT_NAMESPACE);
        assert_eq!(resolved.keyspace.collection, DEFAULT_NAMESPACE);
        assert_eq!(resolved.location("idx1").index_name, "idx1");
    }

    #[test]
    fn test_resolve_rejects_missing_coordinates() {
        let err = BuildIndexRequest::new("", "proj", "cluster", "bucket")
            .with_indexes(["idx1"])
            .resolve()
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidRequest(_)));
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);

        let err = request().with_scope("").with_indexes(["idx1"]).resolve().unwrap_err();
        assert!(err.to_string().contains("scope_name"));
    }

    #[test]
    fn test_resolve_rejects_empty_index_list() {
        let err = request().resolve().unwrap_err();
        assert!(matches!(err, WorkflowError::Configuration { .. }));

        let err = request().with_indexes(["idx1", " "]).resolve().unwrap_err();
        assert!(matches!(err, WorkflowError::Configuration { .. }));
    }

    #[test]
    fn test_resolve_drops_duplicates_keeping_order() {
        let resolved = request()
            .with_indexes(["b", "a", "b", "c", "a"])
            .resolve()
            .unwrap();

        assert_eq!(resolved.index_names, vec!["b", "a", "c"]);
    }
}
