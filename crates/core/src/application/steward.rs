// Steward Facade
// Entry point for callers building workflow, activity and child workflow stubs

use super::lifecycle::RegistryLifecycle;
use super::resolver::StubResolver;
use super::stubs::{ActivityStubBuilder, ChildWorkflowStubBuilder, WorkflowStubBuilder};
use crate::domain::{DomainError, StubHandle, WorkflowOptions};
use crate::error::Result;
use crate::port::{ActivityCompletionClient, IdProvider, UuidProvider, WorkflowClient};
use std::sync::Arc;

/// Stub factory bound to one lifecycle and one engine client
#[derive(Clone)]
pub struct Steward {
    client: Arc<dyn WorkflowClient>,
    resolver: StubResolver,
    ids: Arc<dyn IdProvider>,
}

impl Steward {
    pub fn new(lifecycle: &Arc<RegistryLifecycle>, client: Arc<dyn WorkflowClient>) -> Self {
        Self {
            client,
            resolver: StubResolver::new(lifecycle),
            ids: Arc::new(UuidProvider),
        }
    }

    /// Replace the workflow id generator (deterministic ids in tests)
    pub fn with_id_provider(mut self, ids: Arc<dyn IdProvider>) -> Self {
        self.ids = ids;
        self
    }

    pub fn resolver(&self) -> &StubResolver {
        &self.resolver
    }

    /// Builder for a new execution of `type_name`
    pub fn new_stub(&self, type_name: impl Into<String>) -> WorkflowStubBuilder {
        WorkflowStubBuilder::new(
            Arc::clone(&self.client),
            self.resolver.clone(),
            Arc::clone(&self.ids),
            type_name,
        )
    }

    /// Stub attached to a running execution
    pub fn existing_stub(&self, type_name: &str, workflow_id: &str) -> Result<StubHandle> {
        if type_name.trim().is_empty() {
            return Err(DomainError::EmptyTypeName.into());
        }
        Self::require_id(workflow_id)?;
        Ok(self
            .client
            .existing_workflow_stub(Some(type_name), workflow_id)?)
    }

    /// Untyped stub from caller-built options; a non-empty `task_queue` wins
    pub fn new_untyped_stub(
        &self,
        type_name: &str,
        mut options: WorkflowOptions,
    ) -> Result<StubHandle> {
        if type_name.trim().is_empty() {
            return Err(DomainError::EmptyTypeName.into());
        }
        options.task_queue = self
            .resolver
            .resolve_for_call(type_name, Some(options.task_queue.as_str()));
        if options.workflow_id.trim().is_empty() {
            options.workflow_id = self.ids.generate_id();
        }
        Ok(self.client.new_workflow_stub(type_name, options)?)
    }

    pub fn existing_untyped_stub(&self, workflow_id: &str) -> Result<StubHandle> {
        Self::require_id(workflow_id)?;
        Ok(self.client.existing_workflow_stub(None, workflow_id)?)
    }

    pub fn activity(&self, type_name: impl Into<String>) -> ActivityStubBuilder {
        ActivityStubBuilder::new(Arc::clone(&self.client), self.resolver.clone(), type_name)
    }

    pub fn child(&self, type_name: impl Into<String>) -> ChildWorkflowStubBuilder {
        ChildWorkflowStubBuilder::new(Arc::clone(&self.client), self.resolver.clone(), type_name)
    }

    /// Completion client of the underlying engine client
    pub fn completion_client(&self) -> Arc<dyn ActivityCompletionClient> {
        self.client.completion_client()
    }

    fn require_id(workflow_id: &str) -> Result<()> {
        if workflow_id.trim().is_empty() {
            return Err(DomainError::ValidationError("workflow id cannot be empty".to_string()).into());
        }
        Ok(())
    }
}
