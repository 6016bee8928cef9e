// Steward Infrastructure - In-Memory Adapters
// Implements: WorkflowEngine, WorkerFactory, EngineWorker, WorkflowClient, ComponentSource

pub mod client;
pub mod component_source;
pub mod constants;
pub mod engine;
pub mod shutdown;
pub mod worker;

pub use client::RecordingClient;
pub use component_source::StaticComponentSource;
pub use engine::{InMemoryEngine, MemoryWorkerFactory};
pub use worker::MemoryWorker;
