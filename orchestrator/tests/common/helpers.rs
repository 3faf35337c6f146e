//! Test helpers for driving the orchestrator against a mocked gateway

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use gateway::{GatewayError, MockIndexGateway};
use orchestrator::{
    BuildIndexRequest, BuildOrchestrator, BuildOutcome, Cancellation, ProgressReporter,
    WorkflowConfig, WorkflowResult,
};
use shared::{IndexStatus, ProgressEvent};

/// One scripted answer to a status query
#[derive(Debug, Clone)]
pub enum Reply {
    Status(&'static str),
    Fail(u16),
}

/// Builds a `MockIndexGateway` whose status answers are scripted per index
///
/// Each index walks through its replies in order; the last reply repeats.
/// Every queried index name is recorded so tests can assert what was never
/// asked.
pub struct ScriptedGateway {
    replies: HashMap<String, Vec<Reply>>,
    queried: Arc<Mutex<Vec<String>>>,
    statements: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            queried: Arc::new(Mutex::new(Vec::new())),
            statements: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn index(mut self, name: &str, replies: &[Reply]) -> Self {
        self.replies.insert(name.to_string(), replies.to_vec());
        self
    }

    /// Index names in the order they were queried
    pub fn queried(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.queried)
    }

    /// Build statements in the order they were submitted
    pub fn statements(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.statements)
    }

    /// Mock that answers status queries and accepts every build
    pub fn accepting(self) -> MockIndexGateway {
        let statements = Arc::clone(&self.statements);
        let mut mock = self.status_only();
        mock.expect_build_indexes()
            .times(0..=1)
            .returning(move |_, batch| {
                statements.lock().unwrap().push(batch.statement());
                Ok(())
            });
        mock
    }

    /// Mock whose single build call fails with the given remote status
    pub fn rejecting(self, status: u16) -> MockIndexGateway {
        let mut mock = self.status_only();
        mock.expect_build_indexes()
            .times(1)
            .returning(move |_, _| Err(remote_error(status)));
        mock
    }

    /// Mock that fails the test if a build is ever submitted
    pub fn never_builds(self) -> MockIndexGateway {
        let mut mock = self.status_only();
        mock.expect_build_indexes().times(0);
        mock
    }

    fn status_only(self) -> MockIndexGateway {
        let Self {
            replies, queried, ..
        } = self;
        let mut positions: HashMap<String, usize> = HashMap::new();

        let mut mock = MockIndexGateway::new();
        mock.expect_index_build_status()
            .returning(move |location| {
                let name = location.index_name.clone();
                queried.lock().unwrap().push(name.clone());

                let script = replies
                    .get(&name)
                    .unwrap_or_else(|| panic!("unexpected status query for {name}"));
                let position = positions.entry(name).or_insert(0);
                let reply = script[(*position).min(script.len() - 1)].clone();
                *position += 1;

                match reply {
                    Reply::Status(status) => Ok(IndexStatus::from(status)),
                    Reply::Fail(status) => Err(remote_error(status)),
                }
            });
        mock
    }
}

pub fn remote_error(status: u16) -> GatewayError {
    GatewayError::Remote {
        status,
        message: format!("scripted failure {status}"),
    }
}

/// Miscellaneous helpers for running the workflow
pub struct TestHelpers;

impl TestHelpers {
    /// Run the workflow once and collect every progress message it emitted
    pub async fn run_collecting(
        gateway: MockIndexGateway,
        config: WorkflowConfig,
        request: BuildIndexRequest,
        cancel: &Cancellation,
    ) -> (WorkflowResult<BuildOutcome>, Vec<String>) {
        let orchestrator = BuildOrchestrator::new(gateway, config);
        let (progress, events) = ProgressReporter::channel();

        let result = orchestrator.run(request, &progress, cancel).await;
        drop(progress);

        (result, Self::drain(events).await)
    }

    pub async fn drain(mut events: mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<String> {
        let mut messages = Vec::new();
        while let Some(event) = events.recv().await {
            messages.push(event.message);
        }
        messages
    }
}
