// Stub Builders
// Populate engine option structs field by field; only the queue is computed here

use super::resolver::StubResolver;
use crate::domain::{
    ActivityOptions, ChildWorkflowOptions, DomainError, RetryOptions, StubHandle,
    WorkflowOptions,
};
use crate::error::Result;
use crate::port::{IdProvider, WorkflowClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

fn require_type(type_name: &str) -> Result<()> {
    if type_name.trim().is_empty() {
        return Err(DomainError::EmptyTypeName.into());
    }
    Ok(())
}

/// Builder for a stub that starts a new workflow execution
pub struct WorkflowStubBuilder {
    client: Arc<dyn WorkflowClient>,
    resolver: StubResolver,
    ids: Arc<dyn IdProvider>,
    type_name: String,
    options: WorkflowOptions,
}

impl WorkflowStubBuilder {
    pub(crate) fn new(
        client: Arc<dyn WorkflowClient>,
        resolver: StubResolver,
        ids: Arc<dyn IdProvider>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            resolver,
            ids,
            type_name: type_name.into(),
            options: WorkflowOptions::default(),
        }
    }

    pub fn workflow_id(mut self, id: impl Into<String>) -> Self {
        self.options.workflow_id = id.into();
        self
    }

    /// Explicit queue; overrides registry and convention
    pub fn task_queue(mut self, queue: impl Into<String>) -> Self {
        self.options.task_queue = queue.into();
        self
    }

    pub fn run_timeout(mut self, timeout: Duration) -> Self {
        self.options.run_timeout = Some(timeout);
        self
    }

    pub fn execution_timeout(mut self, timeout: Duration) -> Self {
        self.options.execution_timeout = Some(timeout);
        self
    }

    pub fn task_timeout(mut self, timeout: Duration) -> Self {
        self.options.task_timeout = Some(timeout);
        self
    }

    pub fn retry_options(mut self, retry: RetryOptions) -> Self {
        self.options.retry = Some(retry);
        self
    }

    pub fn cron_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.options.cron_schedule = Some(schedule.into());
        self
    }

    pub fn memo(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.memo.insert(key.into(), value);
        self
    }

    pub fn search_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.search_attributes.insert(key.into(), value);
        self
    }

    pub fn context_propagator(mut self, name: impl Into<String>) -> Self {
        self.options.context_propagators.push(name.into());
        self
    }

    /// Resolve the queue, fill in a workflow id if unset, and create the stub
    ///
    /// # Errors
    /// - AppError::Domain if the type name is blank
    /// - AppError::Engine if the client rejects the stub
    pub fn build(self) -> Result<StubHandle> {
        require_type(&self.type_name)?;

        let mut options = self.options;
        options.task_queue = self
            .resolver
            .resolve_for_call(&self.type_name, Some(options.task_queue.as_str()));
        if options.workflow_id.trim().is_empty() {
            options.workflow_id = self.ids.generate_id();
        }

        debug!(
            type_name = %self.type_name,
            queue = %options.task_queue,
            workflow_id = %options.workflow_id,
            "Building workflow stub"
        );
        Ok(self.client.new_workflow_stub(&self.type_name, options)?)
    }
}

/// Builder for an activity stub used inside workflow code
pub struct ActivityStubBuilder {
    client: Arc<dyn WorkflowClient>,
    resolver: StubResolver,
    type_name: String,
    options: ActivityOptions,
}

impl ActivityStubBuilder {
    pub(crate) fn new(
        client: Arc<dyn WorkflowClient>,
        resolver: StubResolver,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            resolver,
            type_name: type_name.into(),
            options: ActivityOptions::default(),
        }
    }

    pub fn task_queue(mut self, queue: impl Into<String>) -> Self {
        self.options.task_queue = queue.into();
        self
    }

    pub fn start_to_close_timeout(mut self, timeout: Duration) -> Self {
        self.options.start_to_close_timeout = timeout;
        self
    }

    pub fn schedule_to_close_timeout(mut self, timeout: Duration) -> Self {
        self.options.schedule_to_close_timeout = Some(timeout);
        self
    }

    pub fn heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.options.heartbeat_timeout = Some(timeout);
        self
    }

    pub fn retry_options(mut self, retry: RetryOptions) -> Self {
        self.options.retry = Some(retry);
        self
    }

    pub fn build(self) -> Result<StubHandle> {
        require_type(&self.type_name)?;

        let mut options = self.options;
        options.task_queue = self
            .resolver
            .resolve_for_call(&self.type_name, Some(options.task_queue.as_str()));

        debug!(type_name = %self.type_name, queue = %options.task_queue, "Building activity stub");
        Ok(self.client.new_activity_stub(&self.type_name, options)?)
    }
}

/// Builder for a child workflow stub used inside workflow code
pub struct ChildWorkflowStubBuilder {
    client: Arc<dyn WorkflowClient>,
    resolver: StubResolver,
    type_name: String,
    options: ChildWorkflowOptions,
}

impl ChildWorkflowStubBuilder {
    pub(crate) fn new(
        client: Arc<dyn WorkflowClient>,
        resolver: StubResolver,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            resolver,
            type_name: type_name.into(),
            options: ChildWorkflowOptions::default(),
        }
    }

    /// Child ids are assigned by the engine unless set here
    pub fn workflow_id(mut self, id: impl Into<String>) -> Self {
        self.options.workflow_id = Some(id.into());
        self
    }

    pub fn task_queue(mut self, queue: impl Into<String>) -> Self {
        self.options.task_queue = queue.into();
        self
    }

    pub fn run_timeout(mut self, timeout: Duration) -> Self {
        self.options.run_timeout = Some(timeout);
        self
    }

    pub fn execution_timeout(mut self, timeout: Duration) -> Self {
        self.options.execution_timeout = Some(timeout);
        self
    }

    pub fn retry_options(mut self, retry: RetryOptions) -> Self {
        self.options.retry = Some(retry);
        self
    }

    pub fn build(self) -> Result<StubHandle> {
        require_type(&self.type_name)?;

        let mut options = self.options;
        options.task_queue = self
            .resolver
            .resolve_for_call(&self.type_name, Some(options.task_queue.as_str()));

        debug!(type_name = %self.type_name, queue = %options.task_queue, "Building child workflow stub");
        Ok(self.client.new_child_workflow_stub(&self.type_name, options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StewardConfig;
    use crate::domain::{StubKind, DEFAULT_ACTIVITY_START_TO_CLOSE};
    use crate::error::AppError;
    use crate::port::engine::mocks::{FakeCompletionClient, FakeWorkflowClient};
    use crate::port::id_provider::SequentialIdProvider;
    use crate::port::{ActivityCompletionClient, EngineError};
    use serde_json::json;

    fn fixture() -> (Arc<FakeWorkflowClient>, StubResolver, Arc<dyn IdProvider>) {
        (
            Arc::new(FakeWorkflowClient::default()),
            StubResolver::detached(&StewardConfig::default()),
            Arc::new(SequentialIdProvider::new("wf")),
        )
    }

    #[test]
    fn test_workflow_builder_passes_options_through() {
        let (client, resolver, ids) = fixture();

        let stub = WorkflowStubBuilder::new(client.clone(), resolver, ids, "OrderWorkflow")
            .run_timeout(Duration::from_secs(60))
            .cron_schedule("0 * * * *")
            .memo("customer", json!("alice"))
            .search_attribute("Region", json!("eu"))
            .context_propagator("tracing")
            .build()
            .unwrap();

        assert_eq!(stub.kind, StubKind::Workflow);
        assert_eq!(stub.task_queue.as_deref(), Some("ORDER_WORKFLOW_QUEUE"));
        assert_eq!(stub.workflow_id.as_deref(), Some("wf-1"));
        assert_eq!(client.issued().len(), 1);
    }

    #[test]
    fn test_workflow_builder_keeps_explicit_id_and_queue() {
        let (client, resolver, ids) = fixture();

        let stub = WorkflowStubBuilder::new(client, resolver, ids, "OrderWorkflow")
            .workflow_id("order-42")
            .task_queue("RUSH_QUEUE")
            .build()
            .unwrap();

        assert_eq!(stub.task_queue.as_deref(), Some("RUSH_QUEUE"));
        assert_eq!(stub.workflow_id.as_deref(), Some("order-42"));
    }

    #[test]
    fn test_blank_type_rejected() {
        let (client, resolver, ids) = fixture();

        let result = WorkflowStubBuilder::new(client.clone(), resolver.clone(), ids, " ").build();
        assert!(matches!(result, Err(AppError::Domain(DomainError::EmptyTypeName))));

        let result = ActivityStubBuilder::new(client.clone(), resolver, "").build();
        assert!(matches!(result, Err(AppError::Domain(DomainError::EmptyTypeName))));
        assert!(client.issued().is_empty());
    }

    #[test]
    fn test_activity_builder_defaults_timeout() {
        let (client, resolver, _) = fixture();

        let builder = ActivityStubBuilder::new(client.clone(), resolver, "KitchenActivities");
        assert_eq!(
            builder.options.start_to_close_timeout,
            DEFAULT_ACTIVITY_START_TO_CLOSE
        );

        let stub = builder
            .heartbeat_timeout(Duration::from_secs(10))
            .build()
            .unwrap();
        assert_eq!(stub.kind, StubKind::Activity);
        assert_eq!(stub.task_queue.as_deref(), Some("KITCHEN_ACTIVITIES_QUEUE"));
    }

    #[test]
    fn test_child_builder_resolves_queue_and_keeps_optional_id() {
        let (client, resolver, _) = fixture();

        let stub = ChildWorkflowStubBuilder::new(client.clone(), resolver.clone(), "DeliveryWorkflow")
            .build()
            .unwrap();
        assert_eq!(stub.kind, StubKind::ChildWorkflow);
        assert_eq!(stub.task_queue.as_deref(), Some("DELIVERY_WORKFLOW_QUEUE"));
        assert_eq!(stub.workflow_id, None);

        let stub = ChildWorkflowStubBuilder::new(client, resolver, "DeliveryWorkflow")
            .workflow_id("delivery-7")
            .build()
            .unwrap();
        assert_eq!(stub.workflow_id.as_deref(), Some("delivery-7"));
    }

    #[test]
    fn test_client_rejection_surfaces_as_engine_error() {
        struct RejectingClient;
        impl WorkflowClient for RejectingClient {
            fn new_workflow_stub(
                &self,
                type_name: &str,
                _options: WorkflowOptions,
            ) -> std::result::Result<StubHandle, EngineError> {
                Err(EngineError::Rejected(type_name.to_string()))
            }
            fn existing_workflow_stub(
                &self,
                _type_name: Option<&str>,
                workflow_id: &str,
            ) -> std::result::Result<StubHandle, EngineError> {
                Err(EngineError::Rejected(workflow_id.to_string()))
            }
            fn new_activity_stub(
                &self,
                type_name: &str,
                _options: ActivityOptions,
            ) -> std::result::Result<StubHandle, EngineError> {
                Err(EngineError::Rejected(type_name.to_string()))
            }
            fn new_child_workflow_stub(
                &self,
                type_name: &str,
                _options: ChildWorkflowOptions,
            ) -> std::result::Result<StubHandle, EngineError> {
                Err(EngineError::Rejected(type_name.to_string()))
            }
            fn completion_client(&self) -> Arc<dyn ActivityCompletionClient> {
                Arc::new(FakeCompletionClient::default())
            }
        }

        let (_, resolver, ids) = fixture();
        let result =
            WorkflowStubBuilder::new(Arc::new(RejectingClient), resolver, ids, "OrderWorkflow")
                .build();
        assert!(matches!(
            result,
            Err(AppError::Engine(EngineError::Rejected(_)))
        ));
    }
}
