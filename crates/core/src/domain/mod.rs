// Domain Layer - Pure naming and binding rules

pub mod binding;
pub mod candidate;
pub mod error;
pub mod lifecycle;
pub mod naming;
pub mod options;
pub mod queue;

// Re-exports
pub use binding::{Role, TypeBinding, TypeName};
pub use candidate::{ActivityComponent, ActivityObject, Candidate, WorkflowComponent};
pub use error::DomainError;
pub use lifecycle::LifecycleState;
pub use naming::{derive_queue_name, simple_name};
pub use options::{
    ActivityOptions, ChildWorkflowOptions, RetryOptions, StubHandle, StubKind, WorkflowOptions,
    DEFAULT_ACTIVITY_START_TO_CLOSE,
};
pub use queue::{QueueConfig, QueueId};
