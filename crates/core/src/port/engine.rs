// Workflow Engine Port
// Abstraction over the external durable-execution engine (workers + client)

use crate::domain::{
    ActivityObject, ActivityOptions, ChildWorkflowOptions, StubHandle, WorkflowOptions,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Worker already exists for queue: {0}")]
    AlreadyExists(String),

    #[error("No worker for queue: {0}")]
    WorkerNotFound(String),

    #[error("Worker factory already claimed for connection: {0}")]
    FactoryClaimed(String),

    #[error("Registration rejected: {0}")]
    Rejected(String),

    #[error("Engine unavailable: {0}")]
    Unavailable(String),
}

/// Engine-side worker polling a single task queue
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EngineWorker: Send + Sync {
    /// Register a workflow implementation type
    fn register_workflow_type(&self, type_name: &str) -> Result<(), EngineError>;

    /// Register an activity implementation instance
    fn register_activity_instance(
        &self,
        type_name: &str,
        instance: ActivityObject,
    ) -> Result<(), EngineError>;

    /// Begin polling/serving the queue
    ///
    /// # Errors
    /// - EngineError::Unavailable if the engine cannot be reached
    async fn start(&self) -> Result<(), EngineError>;
}

/// Creates workers, at most one per queue name
///
/// Implementations:
/// - InMemoryEngine (steward-infra-memory): in-process engine
/// - mocks::FakeWorkerFactory: recording fake for unit tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkerFactory: Send + Sync {
    /// Create the worker for a queue
    ///
    /// # Errors
    /// - EngineError::AlreadyExists if a worker for `queue` was created before
    fn new_worker(&self, queue: &str) -> Result<Arc<dyn EngineWorker>, EngineError>;

    /// Fetch the existing worker for a queue
    ///
    /// # Errors
    /// - EngineError::WorkerNotFound if no worker was created for `queue`
    fn get_worker(&self, queue: &str) -> Result<Arc<dyn EngineWorker>, EngineError>;

    /// Tear down every worker created by this factory
    async fn shutdown(&self) -> Result<(), EngineError>;
}

/// Completes activities outside of their own invocation
///
/// An activity that hands its task token to another process returns without
/// a result; the holder of the token later reports the outcome here.
pub trait ActivityCompletionClient: Send + Sync {
    fn complete(&self, task_token: &[u8], result: serde_json::Value) -> Result<(), EngineError>;

    fn fail(&self, task_token: &[u8], reason: &str) -> Result<(), EngineError>;

    fn heartbeat(&self, task_token: &[u8], details: serde_json::Value) -> Result<(), EngineError>;
}

/// Client used to build stubs for remote calls
pub trait WorkflowClient: Send + Sync {
    fn new_workflow_stub(
        &self,
        type_name: &str,
        options: WorkflowOptions,
    ) -> Result<StubHandle, EngineError>;

    fn existing_workflow_stub(
        &self,
        type_name: Option<&str>,
        workflow_id: &str,
    ) -> Result<StubHandle, EngineError>;

    fn new_activity_stub(
        &self,
        type_name: &str,
        options: ActivityOptions,
    ) -> Result<StubHandle, EngineError>;

    fn new_child_workflow_stub(
        &self,
        type_name: &str,
        options: ChildWorkflowOptions,
    ) -> Result<StubHandle, EngineError>;

    /// Client for completing activities asynchronously
    fn completion_client(&self) -> Arc<dyn ActivityCompletionClient>;
}

/// One connection to the engine
pub trait WorkflowEngine: Send + Sync {
    /// Human-readable connection identity (target + namespace)
    fn connection(&self) -> String;

    /// Hand out the connection's worker factory, once
    ///
    /// # Errors
    /// - EngineError::FactoryClaimed if another owner already holds it
    fn claim_worker_factory(&self) -> Result<Arc<dyn WorkerFactory>, EngineError>;

    fn client(&self) -> Arc<dyn WorkflowClient>;
}

// ============================================================================
// Fake Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::StubKind;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Recording worker
    #[derive(Default)]
    pub struct FakeWorker {
        workflows: Mutex<Vec<String>>,
        activities: Mutex<Vec<String>>,
        started: AtomicBool,
        fail_start: bool,
    }
    impl FakeWorker {
        pub fn workflows(&self) -> Vec<String> {
            self.workflows.lock().unwrap().clone()
        }
        pub fn activities(&self) -> Vec<String> {
            self.activities.lock().unwrap().clone()
        }
        pub fn is_started(&self) -> bool {
            self.started.load(Ordering::SeqCst)
        }
    }
    #[async_trait]
    impl EngineWorker for FakeWorker {
        fn register_workflow_type(&self, type_name: &str) -> Result<(), EngineError> {
            if self.is_started() {
                return Err(EngineError::Rejected(type_name.to_string()));
            }
            self.workflows.lock().unwrap().push(type_name.to_string());
            Ok(())
        }
        fn register_activity_instance(
            &self,
            type_name: &str,
            _instance: ActivityObject,
        ) -> Result<(), EngineError> {
            if self.is_started() {
                return Err(EngineError::Rejected(type_name.to_string()));
            }
            self.activities.lock().unwrap().push(type_name.to_string());
            Ok(())
        }
        async fn start(&self) -> Result<(), EngineError> {
            if self.fail_start {
                return Err(EngineError::Unavailable("injected start failure".to_string()));
            }
            self.started.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Recording worker factory with optional start failure injection
    #[derive(Default)]
    pub struct FakeWorkerFactory {
        workers: Mutex<HashMap<String, Arc<FakeWorker>>>,
        created: AtomicUsize,
        shutdowns: AtomicUsize,
        fail_start_on: Mutex<Option<String>>,
    }
    impl FakeWorkerFactory {
        pub fn new() -> Self {
            Self::default()
        }
        /// Make the worker for `queue` fail when started
        pub fn fail_start_on(&self, queue: impl Into<String>) {
            *self.fail_start_on.lock().unwrap() = Some(queue.into());
        }
        pub fn worker(&self, queue: &str) -> Option<Arc<FakeWorker>> {
            self.workers.lock().unwrap().get(queue).cloned()
        }
        pub fn created_count(&self) -> usize {
            self.created.load(Ordering::SeqCst)
        }
        pub fn shutdown_count(&self) -> usize {
            self.shutdowns.load(Ordering::SeqCst)
        }
    }
    #[async_trait]
    impl WorkerFactory for FakeWorkerFactory {
        fn new_worker(&self, queue: &str) -> Result<Arc<dyn EngineWorker>, EngineError> {
            let mut workers = self.workers.lock().unwrap();
            if workers.contains_key(queue) {
                return Err(EngineError::AlreadyExists(queue.to_string()));
            }
            let fail_start = self.fail_start_on.lock().unwrap().as_deref() == Some(queue);
            let worker = Arc::new(FakeWorker {
                fail_start,
                ..Default::default()
            });
            workers.insert(queue.to_string(), Arc::clone(&worker));
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(worker as Arc<dyn EngineWorker>)
        }
        fn get_worker(&self, queue: &str) -> Result<Arc<dyn EngineWorker>, EngineError> {
            self.workers
                .lock()
                .unwrap()
                .get(queue)
                .cloned()
                .map(|w| w as Arc<dyn EngineWorker>)
                .ok_or_else(|| EngineError::WorkerNotFound(queue.to_string()))
        }
        async fn shutdown(&self) -> Result<(), EngineError> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Outcome reported through a completion client
    #[derive(Debug, Clone, PartialEq)]
    pub enum CompletionEvent {
        Completed {
            task_token: Vec<u8>,
            result: serde_json::Value,
        },
        Failed {
            task_token: Vec<u8>,
            reason: String,
        },
        Heartbeat {
            task_token: Vec<u8>,
            details: serde_json::Value,
        },
    }

    /// Completion client recording every reported outcome
    #[derive(Default)]
    pub struct FakeCompletionClient {
        events: Mutex<Vec<CompletionEvent>>,
    }
    impl FakeCompletionClient {
        pub fn events(&self) -> Vec<CompletionEvent> {
            self.events.lock().unwrap().clone()
        }
        fn push(&self, task_token: &[u8], event: CompletionEvent) -> Result<(), EngineError> {
            if task_token.is_empty() {
                return Err(EngineError::Rejected("empty task token".to_string()));
            }
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }
    impl ActivityCompletionClient for FakeCompletionClient {
        fn complete(&self, task_token: &[u8], result: serde_json::Value) -> Result<(), EngineError> {
            self.push(
                task_token,
                CompletionEvent::Completed {
                    task_token: task_token.to_vec(),
                    result,
                },
            )
        }
        fn fail(&self, task_token: &[u8], reason: &str) -> Result<(), EngineError> {
            self.push(
                task_token,
                CompletionEvent::Failed {
                    task_token: task_token.to_vec(),
                    reason: reason.to_string(),
                },
            )
        }
        fn heartbeat(&self, task_token: &[u8], details: serde_json::Value) -> Result<(), EngineError> {
            self.push(
                task_token,
                CompletionEvent::Heartbeat {
                    task_token: task_token.to_vec(),
                    details,
                },
            )
        }
    }

    /// Client that echoes options back as stubs
    #[derive(Default)]
    pub struct FakeWorkflowClient {
        issued: Mutex<Vec<StubHandle>>,
        completions: Arc<FakeCompletionClient>,
    }
    impl FakeWorkflowClient {
        pub fn issued(&self) -> Vec<StubHandle> {
            self.issued.lock().unwrap().clone()
        }
        pub fn completions(&self) -> Arc<FakeCompletionClient> {
            Arc::clone(&self.completions)
        }
        fn record(&self, stub: StubHandle) -> Result<StubHandle, EngineError> {
            self.issued.lock().unwrap().push(stub.clone());
            Ok(stub)
        }
    }
    impl WorkflowClient for FakeWorkflowClient {
        fn new_workflow_stub(
            &self,
            type_name: &str,
            options: WorkflowOptions,
        ) -> Result<StubHandle, EngineError> {
            self.record(StubHandle {
                kind: StubKind::Workflow,
                type_name: Some(type_name.to_string()),
                task_queue: Some(options.task_queue),
                workflow_id: Some(options.workflow_id),
            })
        }
        fn existing_workflow_stub(
            &self,
            type_name: Option<&str>,
            workflow_id: &str,
        ) -> Result<StubHandle, EngineError> {
            self.record(StubHandle {
                kind: StubKind::ExistingWorkflow,
                type_name: type_name.map(str::to_string),
                task_queue: None,
                workflow_id: Some(workflow_id.to_string()),
            })
        }
        fn new_activity_stub(
            &self,
            type_name: &str,
            options: ActivityOptions,
        ) -> Result<StubHandle, EngineError> {
            self.record(StubHandle {
                kind: StubKind::Activity,
                type_name: Some(type_name.to_string()),
                task_queue: Some(options.task_queue),
                workflow_id: None,
            })
        }
        fn new_child_workflow_stub(
            &self,
            type_name: &str,
            options: ChildWorkflowOptions,
        ) -> Result<StubHandle, EngineError> {
            self.record(StubHandle {
                kind: StubKind::ChildWorkflow,
                type_name: Some(type_name.to_string()),
                task_queue: Some(options.task_queue),
                workflow_id: options.workflow_id,
            })
        }
        fn completion_client(&self) -> Arc<dyn ActivityCompletionClient> {
            Arc::clone(&self.completions) as Arc<dyn ActivityCompletionClient>
        }
    }

    /// Engine connection handing out a single fake factory
    pub struct FakeEngine {
        factory: Arc<FakeWorkerFactory>,
        client: Arc<FakeWorkflowClient>,
        claimed: AtomicBool,
    }
    impl FakeEngine {
        pub fn new() -> Self {
            Self {
                factory: Arc::new(FakeWorkerFactory::new()),
                client: Arc::new(FakeWorkflowClient::default()),
                claimed: AtomicBool::new(false),
            }
        }
        pub fn factory(&self) -> Arc<FakeWorkerFactory> {
            Arc::clone(&self.factory)
        }
        pub fn fake_client(&self) -> Arc<FakeWorkflowClient> {
            Arc::clone(&self.client)
        }
    }
    impl Default for FakeEngine {
        fn default() -> Self {
            Self::new()
        }
    }
    impl WorkflowEngine for FakeEngine {
        fn connection(&self) -> String {
            "fake://default".to_string()
        }
        fn claim_worker_factory(&self) -> Result<Arc<dyn WorkerFactory>, EngineError> {
            if self.claimed.swap(true, Ordering::SeqCst) {
                return Err(EngineError::FactoryClaimed(self.connection()));
            }
            Ok(Arc::clone(&self.factory) as Arc<dyn WorkerFactory>)
        }
        fn client(&self) -> Arc<dyn WorkflowClient> {
            Arc::clone(&self.client) as Arc<dyn WorkflowClient>
        }
    }
}
