// Application Layer - Discovery, Registry and Queue Resolution

pub mod discovery;
pub mod lifecycle;
pub mod registry;
pub mod resolver;
pub mod steward;
pub mod stubs;
pub mod worker_pool;

// Re-exports
pub use discovery::{DiscoveryCoordinator, DiscoveryReport};
pub use lifecycle::RegistryLifecycle;
pub use registry::QueueRegistry;
pub use resolver::StubResolver;
pub use steward::Steward;
pub use stubs::{ActivityStubBuilder, ChildWorkflowStubBuilder, WorkflowStubBuilder};
pub use worker_pool::{PoolSnapshot, WorkerPool};
