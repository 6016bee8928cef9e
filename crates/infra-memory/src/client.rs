// Recording workflow client
// Issues stub handles and keeps every issued stub for inspection

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use steward_core::domain::{ActivityOptions, ChildWorkflowOptions, StubHandle, WorkflowOptions};
use steward_core::port::engine::mocks::{FakeCompletionClient, FakeWorkflowClient};
use steward_core::port::{ActivityCompletionClient, EngineError, WorkflowClient};
use tracing::debug;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Engine client of an in-memory connection
///
/// Stub bookkeeping is shared with the core's echoing client; this adapter
/// adds per-type rejection and logs what it issues.
#[derive(Default)]
pub struct RecordingClient {
    inner: FakeWorkflowClient,
    rejected_types: Mutex<HashSet<String>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stub issued so far, in order
    pub fn issued(&self) -> Vec<StubHandle> {
        self.inner.issued()
    }

    /// Completion client holding every reported activity outcome
    pub fn completions(&self) -> Arc<FakeCompletionClient> {
        self.inner.completions()
    }

    /// Make stub creation for `type_name` fail with `Rejected`
    pub fn reject_type(&self, type_name: impl Into<String>) {
        locked(&self.rejected_types).insert(type_name.into());
    }

    fn admit(&self, type_name: Option<&str>) -> Result<(), EngineError> {
        match type_name {
            Some(name) if locked(&self.rejected_types).contains(name) => Err(
                EngineError::Rejected(format!("stub for '{}' refused by engine", name)),
            ),
            _ => Ok(()),
        }
    }

    fn logged(stub: Result<StubHandle, EngineError>) -> Result<StubHandle, EngineError> {
        if let Ok(stub) = &stub {
            debug!(
                kind = ?stub.kind,
                queue = ?stub.task_queue,
                workflow_id = ?stub.workflow_id,
                "Issued stub"
            );
        }
        stub
    }
}

impl WorkflowClient for RecordingClient {
    fn new_workflow_stub(
        &self,
        type_name: &str,
        options: WorkflowOptions,
    ) -> Result<StubHandle, EngineError> {
        self.admit(Some(type_name))?;
        Self::logged(self.inner.new_workflow_stub(type_name, options))
    }

    fn existing_workflow_stub(
        &self,
        type_name: Option<&str>,
        workflow_id: &str,
    ) -> Result<StubHandle, EngineError> {
        self.admit(type_name)?;
        Self::logged(self.inner.existing_workflow_stub(type_name, workflow_id))
    }

    fn new_activity_stub(
        &self,
        type_name: &str,
        options: ActivityOptions,
    ) -> Result<StubHandle, EngineError> {
        self.admit(Some(type_name))?;
        Self::logged(self.inner.new_activity_stub(type_name, options))
    }

    fn new_child_workflow_stub(
        &self,
        type_name: &str,
        options: ChildWorkflowOptions,
    ) -> Result<StubHandle, EngineError> {
        self.admit(Some(type_name))?;
        Self::logged(self.inner.new_child_workflow_stub(type_name, options))
    }

    fn completion_client(&self) -> Arc<dyn ActivityCompletionClient> {
        self.inner.completion_client()
    }
}
