// In-process workflow engine
// One InMemoryEngine == one engine connection (target + namespace)

use crate::client::RecordingClient;
use crate::shutdown::StopSignal;
use crate::worker::MemoryWorker;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use steward_core::config::StewardConfig;
use steward_core::port::{EngineError, EngineWorker, WorkerFactory, WorkflowClient, WorkflowEngine};
use tracing::info;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Worker factory of an in-memory connection
pub struct MemoryWorkerFactory {
    connection: String,
    workers: Mutex<BTreeMap<String, Arc<MemoryWorker>>>,
    fail_start_on: Mutex<HashSet<String>>,
    signal: StopSignal,
}

impl MemoryWorkerFactory {
    fn new(connection: String) -> Self {
        Self {
            connection,
            workers: Mutex::new(BTreeMap::new()),
            fail_start_on: Mutex::new(HashSet::new()),
            signal: StopSignal::new(),
        }
    }

    /// Concrete worker for a queue (inspection)
    pub fn worker(&self, queue: &str) -> Option<Arc<MemoryWorker>> {
        locked(&self.workers).get(queue).cloned()
    }

    /// Queues with a worker, sorted
    pub fn queues(&self) -> Vec<String> {
        locked(&self.workers).keys().cloned().collect()
    }

    pub fn worker_count(&self) -> usize {
        locked(&self.workers).len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.signal.is_triggered()
    }
}

#[async_trait]
impl WorkerFactory for MemoryWorkerFactory {
    fn new_worker(&self, queue: &str) -> Result<Arc<dyn EngineWorker>, EngineError> {
        if self.is_shut_down() {
            return Err(EngineError::Unavailable(format!(
                "{} is shut down",
                self.connection
            )));
        }

        let mut workers = locked(&self.workers);
        if workers.contains_key(queue) {
            return Err(EngineError::AlreadyExists(queue.to_string()));
        }

        let fail_start = locked(&self.fail_start_on).contains(queue);
        let worker = Arc::new(MemoryWorker::new(queue, self.signal.token(), fail_start));
        workers.insert(queue.to_string(), Arc::clone(&worker));
        info!(connection = %self.connection, queue = %queue, "Created worker");
        Ok(worker as Arc<dyn EngineWorker>)
    }

    fn get_worker(&self, queue: &str) -> Result<Arc<dyn EngineWorker>, EngineError> {
        self.worker(queue)
            .map(|w| w as Arc<dyn EngineWorker>)
            .ok_or_else(|| EngineError::WorkerNotFound(queue.to_string()))
    }

    async fn shutdown(&self) -> Result<(), EngineError> {
        self.signal.trigger();

        let workers: Vec<Arc<MemoryWorker>> = locked(&self.workers).values().cloned().collect();
        join_all(workers.iter().map(|w| w.join())).await;

        info!(
            connection = %self.connection,
            workers = workers.len(),
            "Worker factory shut down"
        );
        Ok(())
    }
}

/// In-process engine connection
///
/// Hands out its worker factory once; a second claim fails with
/// `EngineError::FactoryClaimed`.
pub struct InMemoryEngine {
    target: String,
    namespace: String,
    factory: Arc<MemoryWorkerFactory>,
    client: Arc<RecordingClient>,
    claimed: AtomicBool,
}

impl InMemoryEngine {
    pub fn new(target: impl Into<String>, namespace: impl Into<String>) -> Self {
        let target = target.into();
        let namespace = namespace.into();
        let factory = Arc::new(MemoryWorkerFactory::new(format!("{}/{}", target, namespace)));
        Self {
            target,
            namespace,
            factory,
            client: Arc::new(RecordingClient::new()),
            claimed: AtomicBool::new(false),
        }
    }

    /// Connection for the target and namespace named in the config
    pub fn from_config(config: &StewardConfig) -> Self {
        Self::new(config.target.clone(), config.namespace.clone())
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Make the worker for `queue` fail to start (must be set before it is created)
    pub fn fail_start_on(&self, queue: impl Into<String>) {
        locked(&self.factory.fail_start_on).insert(queue.into());
    }

    pub fn factory(&self) -> Arc<MemoryWorkerFactory> {
        Arc::clone(&self.factory)
    }

    pub fn recording_client(&self) -> Arc<RecordingClient> {
        Arc::clone(&self.client)
    }
}

impl WorkflowEngine for InMemoryEngine {
    fn connection(&self) -> String {
        format!("{}/{}", self.target, self.namespace)
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

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[test]
    fn test_single_claim_per_connection() {
        let engine = InMemoryEngine::new("127.0.0.1:7233", "default");
        assert_eq!(engine.connection(), "127.0.0.1:7233/default");

        assert!(engine.claim_worker_factory().is_ok());
        assert_eq!(
            engine.claim_worker_factory().err(),
            Some(EngineError::FactoryClaimed("127.0.0.1:7233/default".to_string()))
        );
    }

    #[test]
    fn test_one_worker_per_queue() {
        let engine = InMemoryEngine::from_config(&StewardConfig::default());
        let factory = engine.claim_worker_factory().unwrap();

        assert_ok!(factory.new_worker("KITCHEN_QUEUE"));
        assert_eq!(
            factory.new_worker("KITCHEN_QUEUE").err(),
            Some(EngineError::AlreadyExists("KITCHEN_QUEUE".to_string()))
        );
        assert!(factory.get_worker("KITCHEN_QUEUE").is_ok());
        assert_eq!(
            factory.get_worker("MISSING").err(),
            Some(EngineError::WorkerNotFound("MISSING".to_string()))
        );
        assert_eq!(engine.factory().queues(), vec!["KITCHEN_QUEUE"]);
    }

    #[tokio::test]
    async fn test_shutdown_stops_every_worker() {
        let engine = InMemoryEngine::new("localhost:7233", "test");
        let factory = engine.claim_worker_factory().unwrap();

        for queue in ["A_QUEUE", "B_QUEUE"] {
            factory.new_worker(queue).unwrap().start().await.unwrap();
        }
        factory.shutdown().await.unwrap();

        assert!(engine.factory().is_shut_down());
        assert!(matches!(
            factory.new_worker("C_QUEUE"),
            Err(EngineError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_fail_start_on_queue() {
        let engine = InMemoryEngine::new("localhost:7233", "test");
        engine.fail_start_on("BROKEN_QUEUE");
        let factory = engine.claim_worker_factory().unwrap();

        let worker = factory.new_worker("BROKEN_QUEUE").unwrap();
        assert!(matches!(
            worker.start().await,
            Err(EngineError::Unavailable(_))
        ));
        let healthy = assert_ok!(factory.new_worker("OK_QUEUE"));
        assert_ok!(healthy.start().await);
        factory.shutdown().await.unwrap();
    }
}
