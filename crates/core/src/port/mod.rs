// Port Layer - Interfaces for external collaborators

pub mod component_source;
pub mod engine;
pub mod id_provider; // For deterministic testing

// Re-exports
pub use component_source::ComponentSource;
pub use engine::{
    ActivityCompletionClient, EngineError, EngineWorker, WorkerFactory, WorkflowClient,
    WorkflowEngine,
};
pub use id_provider::{IdProvider, SequentialIdProvider, UuidProvider};
