//! Core shared types for locating and describing deferred indexes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{SharedError, SharedResult};

/// Scope and collection name used when the caller leaves them unset
pub const DEFAULT_NAMESPACE: &str = "_default";

/// Coordinates of the cluster an index lives in
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterRef {
    pub organization_id: String,
    pub project_id: String,
    pub cluster_id: String,
}

impl ClusterRef {
    pub fn new(
        organization_id: impl Into<String>,
        project_id: impl Into<String>,
        cluster_id: impl Into<String>,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            project_id: project_id.into(),
            cluster_id: cluster_id.into(),
        }
    }

    /// Reject blank identifiers before they end up in a request path
    pub fn validate(&self) -> SharedResult<()> {
        require("organization_id", &self.organization_id)?;
        require("project_id", &self.project_id)?;
        require("cluster_id", &self.cluster_id)
    }
}

impl fmt::Display for ClusterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.organization_id, self.project_id, self.cluster_id)
    }
}

/// Bucket, scope and collection triple shared by every index in a build batch
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keyspace {
    pub bucket: String,
    pub scope: String,
    pub collection: String,
}

impl Keyspace {
    /// Build a keyspace, falling back to `_default` for missing scope or collection
    pub fn with_defaults(bucket: impl Into<String>, scope: Option<String>, collection: Option<String>) -> Self {
        Self {
            bucket: bucket.into(),
            scope: scope.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            collection: collection.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        }
    }

    pub fn validate(&self) -> SharedResult<()> {
        require("bucket_name", &self.bucket)?;
        require("scope_name", &self.scope)?;
        require("collection_name", &self.collection)
    }
}

impl fmt::Display for Keyspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`.`{}`.`{}`", self.bucket, self.scope, self.collection)
    }
}

fn require(field: &str, value: &str) -> SharedResult<()> {
    if value.trim().is_empty() {
        return Err(SharedError::MissingField { field: field.to_string() });
    }
    Ok(())
}

/// Fully resolved coordinates of a single index
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexLocation {
    pub cluster: ClusterRef,
    pub keyspace: Keyspace,
    pub index_name: String,
}

impl IndexLocation {
    pub fn new(cluster: ClusterRef, keyspace: Keyspace, index_name: impl Into<String>) -> Self {
        Self {
            cluster,
            keyspace,
            index_name: index_name.into(),
        }
    }
}

/// Build state reported by the remote indexing service
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IndexStatus {
    /// Deferred and ready to be built
    Created,
    /// Queued for creation, must be polled again before it can be built
    ScheduledForCreation,
    Building,
    Error,
    /// Any other provider specific state, kept verbatim
    Other(String),
}

impl IndexStatus {
    pub const CREATED: &'static str = "Created";
    pub const SCHEDULED_FOR_CREATION: &'static str = "Scheduled for Creation";
    pub const BUILDING: &'static str = "Building";
    pub const ERROR: &'static str = "Error";

    /// Raw status string as reported on the wire
    pub fn as_str(&self) -> &str {
        match self {
            IndexStatus::Created => Self::CREATED,
            IndexStatus::ScheduledForCreation => Self::SCHEDULED_FOR_CREATION,
            IndexStatus::Building => Self::BUILDING,
            IndexStatus::Error => Self::ERROR,
            IndexStatus::Other(raw) => raw,
        }
    }

    pub fn is_buildable(&self) -> bool {
        matches!(self, IndexStatus::Created)
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self, IndexStatus::ScheduledForCreation)
    }
}

impl From<String> for IndexStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            Self::CREATED => IndexStatus::Created,
            Self::SCHEDULED_FOR_CREATION => IndexStatus::ScheduledForCreation,
            Self::BUILDING => IndexStatus::Building,
            Self::ERROR => IndexStatus::Error,
            _ => IndexStatus::Other(raw),
        }
    }
}

impl From<&str> for IndexStatus {
    fn from(raw: &str) -> Self {
        IndexStatus::from(raw.to_string())
    }
}

impl From<IndexStatus> for String {
    fn from(status: IndexStatus) -> Self {
        match status {
            IndexStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deferred indexes submitted together in one build command
///
/// A batch only ever covers a single keyspace; the remote API accepts one
/// bucket/scope/collection per build statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildBatch {
    pub keyspace: Keyspace,
    pub index_names: Vec<String>,
}

impl BuildBatch {
    pub fn new(keyspace: Keyspace) -> Self {
        Self {
            keyspace,
            index_names: Vec::new(),
        }
    }

    pub fn push(&mut self, index_name: impl Into<String>) {
        self.index_names.push(index_name.into());
    }

    pub fn is_empty(&self) -> bool {
        self.index_names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.index_names.len()
    }

    /// Render the `BUILD INDEX` statement for this batch
    pub fn statement(&self) -> String {
        format!("BUILD INDEX ON {}({})", self.keyspace, self.index_names.join(", "))
    }
}

/// Human readable status line emitted while a workflow runs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl ProgressEvent {
    pub fn new(sequence: u64, message: impl Into<String>) -> Self {
        Self {
            sequence,
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_wire_strings() {
        assert_eq!(IndexStatus::from("Created"), IndexStatus::Created);
        assert_eq!(IndexStatus::from("Scheduled for Creation"), IndexStatus::ScheduledForCreation);
        assert_eq!(IndexStatus::from("Building"), IndexStatus::Building);
        assert_eq!(IndexStatus::from("Error"), IndexStatus::Error);
        assert_eq!(IndexStatus::from("Ready"), IndexStatus::Other("Ready".to_string()));

        // Wire strings are case sensitive
        assert_eq!(IndexStatus::from("created"), IndexStatus::Other("created".to_string()));
    }

    #[test]
    fn test_status_keeps_raw_string() {
        let status = IndexStatus::from("Pending Deletion");
        assert_eq!(status.as_str(), "Pending Deletion");
        assert_eq!(IndexStatus::ScheduledForCreation.to_string(), "Scheduled for Creation");
        assert!(IndexStatus::Created.is_buildable());
        assert!(!IndexStatus::Building.is_buildable());
        assert!(IndexStatus::ScheduledForCreation.is_scheduled());
    }

    #[test]
    fn test_status_serializes_as_wire_string() {
        let json = serde_json::to_string(&IndexStatus::ScheduledForCreation).unwrap();
        assert_eq!(json, "\"Scheduled for Creation\"");

        let status: IndexStatus = serde_json::from_str("\"Building\"").unwrap();
        assert_eq!(status, IndexStatus::Building);
    }

    #[test]
    fn test_keyspace_defaults() {
        let keyspace = Keyspace::with_defaults("travel-sample", None, None);
        assert_eq!(keyspace.scope, DEFAULT_NAMESPACE);
        assert_eq!(keyspace.collection, DEFAULT_NAMESPACE);

        let keyspace = Keyspace::with_defaults("travel-sample", Some("inventory".to_string()), None);
        assert_eq!(keyspace.scope, "inventory");
        assert_eq!(keyspace.collection, "_default");
    }

    #[test]
    fn test_validation_rejects_blank_fields() {
        let cluster = ClusterRef::new("org", " ", "cluster");
        match cluster.validate() {
            Err(SharedError::MissingField { field }) => assert_eq!(field, "project_id"),
            other => panic!("unexpected result: {other:?}"),
        }

        let keyspace = Keyspace::with_defaults("", None, None);
        assert!(keyspace.validate().is_err());
        assert!(Keyspace::with_defaults("b", None, None).validate().is_ok());
    }

    #[test]
    fn test_build_statement_format() {
        let mut batch = BuildBatch::new(Keyspace::with_defaults("b", Some("s".to_string()), Some("c".to_string())));
        batch.push("idx1");
        batch.push("idx2");

        assert_eq!(batch.statement(), "BUILD INDEX ON `b`.`s`.`c`(idx1, idx2)");
    }

    #[test]
    fn test_build_statement_with_default_namespace() {
        let mut batch = BuildBatch::new(Keyspace::with_defaults("beer", None, None));
        batch.push("by_name");

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.statement(), "BUILD INDEX ON `beer`.`_default`.`_default`(by_name)");
    }
}
