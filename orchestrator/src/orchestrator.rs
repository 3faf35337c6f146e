//! Deferred index build workflow
//!
//! Walks the requested indexes in order, asks the gateway for each build
//! status, waits out the "Scheduled for Creation" transition and submits one
//! `BUILD INDEX` statement for everything found in the `Created` state.
//! Every remote failure aborts the invocation; builds already submitted are
//! never rolled back.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use gateway::{GatewayError, IndexGateway};
use shared::{BuildBatch, IndexLocation, IndexStatus};

use crate::cancel::{CancelReason, Cancellation};
use crate::error::{WorkflowError, WorkflowResult};
use crate::progress::ProgressReporter;
use crate::types::{BuildIndexRequest, BuildOutcome, SkippedIndex, WorkflowConfig};

/// Stateless driver for the build workflow
///
/// The gateway is shared, so one orchestrator can serve many invocations.
pub struct BuildOrchestrator<G: IndexGateway> {
    gateway: Arc<G>,
    config: WorkflowConfig,
}

impl<G: IndexGateway> BuildOrchestrator<G> {
    pub fn new(gateway: G, config: WorkflowConfig) -> Self {
        Self::with_shared_gateway(Arc::new(gateway), config)
    }

    pub fn with_shared_gateway(gateway: Arc<G>, config: WorkflowConfig) -> Self {
        Self { gateway, config }
    }

    /// Run one invocation of the workflow
    pub async fn run(
        &self,
        request: BuildIndexRequest,
        progress: &ProgressReporter,
        cancel: &Cancellation,
    ) -> WorkflowResult<BuildOutcome> {
        let span = info_span!("build_indexes", invocation = %Uuid::new_v4());
        async {
            let result = self.execute(request, progress, cancel).await;
            if let Err(e) = &result {
                error!(kind = ?e.kind(), "❌ Index build workflow failed: {}", e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        request: BuildIndexRequest,
        progress: &ProgressReporter,
        cancel: &Cancellation,
    ) -> WorkflowResult<BuildOutcome> {
        let plan = request.resolve()?;
        info!(
            cluster = %plan.cluster,
            keyspace = %plan.keyspace,
            indexes = plan.index_names.len(),
            "🚀 Starting deferred index build"
        );

        let mut batch = BuildBatch::new(plan.keyspace.clone());
        let mut skipped = Vec::new();

        for index_name in &plan.index_names {
            let location = plan.location(index_name);

            let mut status = self
                .query_status(&location, cancel)
                .await?
                .map_err(|source| WorkflowError::StatusQuery {
                    index: index_name.clone(),
                    source,
                })?;

            progress.report(format!("Index: {index_name}, Status: {status}"));

            if status.is_scheduled() {
                status = self
                    .wait_for_scheduled_creation(&location, progress, cancel)
                    .await?;
            }

            if status.is_buildable() {
                batch.push(index_name.clone());
            } else {
                debug!(index = %index_name, status = %status, "Index not buildable, skipping");
                skipped.push(SkippedIndex {
                    name: index_name.clone(),
                    status,
                });
            }
        }

        if batch.is_empty() {
            progress.report("No indexes need built");
            return Ok(BuildOutcome {
                built: Vec::new(),
                skipped,
            });
        }

        progress.report(format!(
            "The following indexes need built: [{}]",
            batch.index_names.join(", ")
        ));

        cancel
            .run(self.gateway.build_indexes(&plan.cluster, &batch))
            .await
            .map_err(cancelled)?
            .map_err(|source| WorkflowError::Build {
                indexes: batch.index_names.clone(),
                source,
            })?;

        progress.report("finished action invocation, Indexes will be built in the background.");
        info!(built = batch.len(), skipped = skipped.len(), "✅ Build statement submitted");

        Ok(BuildOutcome {
            built: batch.index_names,
            skipped,
        })
    }

    /// Re-poll an index until it leaves the scheduled state
    ///
    /// Bounded by `max_wait`; at least one re-poll always happens.
    pub async fn wait_for_scheduled_creation(
        &self,
        location: &IndexLocation,
        progress: &ProgressReporter,
        cancel: &Cancellation,
    ) -> WorkflowResult<IndexStatus> {
        let index_name = &location.index_name;
        let started = Instant::now();
        let mut polls = 0u32;

        loop {
            cancel
                .run(tokio::time::sleep(self.config.poll_interval))
                .await
                .map_err(cancelled)?;

            let status = self
                .query_status(location, cancel)
                .await?
                .map_err(|source| WorkflowError::WaitForScheduled {
                    index: index_name.clone(),
                    source,
                })?;
            polls += 1;

            if !status.is_scheduled() {
                debug!(index = %index_name, status = %status, polls, "Index left scheduled state");
                progress.report(format!("Index: {index_name}, Status: {status}"));
                return Ok(status);
            }

            let waited = started.elapsed();
            if waited >= self.config.max_wait {
                return Err(WorkflowError::WaitTimeout {
                    index: index_name.clone(),
                    waited,
                    polls,
                });
            }

            progress.report(format!(
                "Index: {index_name} is still scheduled for creation, waited {}s",
                waited.as_secs()
            ));
        }
    }

    async fn query_status(
        &self,
        location: &IndexLocation,
        cancel: &Cancellation,
    ) -> WorkflowResult<Result<IndexStatus, GatewayError>> {
        cancel
            .run(self.gateway.index_build_status(location))
            .await
            .map_err(cancelled)
    }
}

fn cancelled(reason: CancelReason) -> WorkflowError {
    WorkflowError::Cancelled { reason }
}
