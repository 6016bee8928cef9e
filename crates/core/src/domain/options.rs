// Per-call Option Objects
//
// Only `task_queue` is computed here; every other field is passed through to
// the engine as set by the caller.

use std::collections::HashMap;
use std::time::Duration;

/// Default activity start-to-close timeout (5 minutes)
pub const DEFAULT_ACTIVITY_START_TO_CLOSE: Duration = Duration::from_secs(5 * 60);

/// Engine retry policy (opaque to queue resolution)
#[derive(Debug, Clone, PartialEq)]
pub struct RetryOptions {
    pub initial_interval: Duration,
    pub backoff_coefficient: f64,
    pub maximum_interval: Option<Duration>,
    /// 0 means unlimited
    pub maximum_attempts: u32,
    pub non_retryable_error_types: Vec<String>,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            backoff_coefficient: 2.0,
            maximum_interval: None,
            maximum_attempts: 0,
            non_retryable_error_types: Vec::new(),
        }
    }
}

/// Options for starting a workflow execution from outside a workflow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowOptions {
    pub task_queue: String,
    pub workflow_id: String,
    pub run_timeout: Option<Duration>,
    pub execution_timeout: Option<Duration>,
    pub task_timeout: Option<Duration>,
    pub retry: Option<RetryOptions>,
    pub cron_schedule: Option<String>,
    pub memo: HashMap<String, serde_json::Value>,
    pub search_attributes: HashMap<String, serde_json::Value>,
    pub context_propagators: Vec<String>,
}

/// Options for an activity invoked from workflow code
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityOptions {
    pub task_queue: String,
    pub start_to_close_timeout: Duration,
    pub schedule_to_close_timeout: Option<Duration>,
    pub heartbeat_timeout: Option<Duration>,
    pub retry: Option<RetryOptions>,
}

impl Default for ActivityOptions {
    fn default() -> Self {
        Self {
            task_queue: String::new(),
            start_to_close_timeout: DEFAULT_ACTIVITY_START_TO_CLOSE,
            schedule_to_close_timeout: None,
            heartbeat_timeout: None,
            retry: None,
        }
    }
}

/// Options for a child workflow started from workflow code
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildWorkflowOptions {
    pub task_queue: String,
    pub workflow_id: Option<String>,
    pub run_timeout: Option<Duration>,
    pub execution_timeout: Option<Duration>,
    pub retry: Option<RetryOptions>,
}

/// Kind of remote call a stub issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubKind {
    Workflow,
    ExistingWorkflow,
    Activity,
    ChildWorkflow,
}

/// Stub returned by the engine client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubHandle {
    pub kind: StubKind,
    /// None for untyped stubs attached to an existing execution
    pub type_name: Option<String>,
    /// None for stubs attached to an existing execution
    pub task_queue: Option<String>,
    pub workflow_id: Option<String>,
}
