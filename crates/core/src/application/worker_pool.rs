// Worker Pool - one engine worker per distinct queue name

use crate::domain::{ActivityObject, QueueId};
use crate::error::{AppError, Result};
use crate::port::{EngineError, EngineWorker, WorkerFactory};
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

struct PoolEntry {
    worker: Arc<dyn EngineWorker>,
    workflow_types: BTreeSet<String>,
    activity_types: BTreeSet<String>,
}

/// Registered implementations per queue (read-only view)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub queue: QueueId,
    pub workflow_types: Vec<String>,
    pub activity_types: Vec<String>,
}

/// Lazily created workers keyed by queue name
pub struct WorkerPool {
    factory: Arc<dyn WorkerFactory>,
    entries: Mutex<BTreeMap<QueueId, PoolEntry>>,
    started: AtomicBool,
}

impl WorkerPool {
    pub fn new(factory: Arc<dyn WorkerFactory>) -> Self {
        Self {
            factory,
            entries: Mutex::new(BTreeMap::new()),
            started: AtomicBool::new(false),
        }
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<QueueId, PoolEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the worker for `queue`, creating it on first reference
    ///
    /// Idempotent for sequential and concurrent callers. An engine-side
    /// "already exists" answer is treated as success and the existing
    /// worker is adopted.
    pub fn get_or_create(&self, queue: &str) -> Result<Arc<dyn EngineWorker>> {
        let mut entries = self.entries();
        if let Some(entry) = entries.get(queue) {
            return Ok(Arc::clone(&entry.worker));
        }

        let worker = match self.factory.new_worker(queue) {
            Ok(worker) => {
                info!(queue = %queue, "Created worker");
                worker
            }
            Err(EngineError::AlreadyExists(_)) => {
                debug!(queue = %queue, "Worker already exists in engine, adopting it");
                self.factory.get_worker(queue)?
            }
            Err(e) => return Err(e.into()),
        };

        entries.insert(
            queue.to_string(),
            PoolEntry {
                worker: Arc::clone(&worker),
                workflow_types: BTreeSet::new(),
                activity_types: BTreeSet::new(),
            },
        );
        Ok(worker)
    }

    fn ensure_not_started(&self, what: &str) -> Result<()> {
        if self.started.load(Ordering::SeqCst) {
            return Err(AppError::InvalidState(format!(
                "cannot register {} after workers have started",
                what
            )));
        }
        Ok(())
    }

    /// Register a workflow implementation type on the worker for `queue`
    pub fn register_workflow(&self, queue: &str, type_name: &str) -> Result<()> {
        self.ensure_not_started(type_name)?;
        let worker = self.get_or_create(queue)?;
        worker.register_workflow_type(type_name)?;

        if let Some(entry) = self.entries().get_mut(queue) {
            entry.workflow_types.insert(type_name.to_string());
        }
        info!(queue = %queue, workflow = %type_name, "Registered workflow");
        Ok(())
    }

    /// Register an activity implementation instance on the worker for `queue`
    pub fn register_activity(
        &self,
        queue: &str,
        type_name: &str,
        instance: ActivityObject,
    ) -> Result<()> {
        self.ensure_not_started(type_name)?;
        let worker = self.get_or_create(queue)?;
        worker.register_activity_instance(type_name, instance)?;

        if let Some(entry) = self.entries().get_mut(queue) {
            entry.activity_types.insert(type_name.to_string());
        }
        info!(queue = %queue, activity = %type_name, "Registered activity");
        Ok(())
    }

    /// Start every worker as one batch
    ///
    /// # Errors
    /// - AppError::PoolStart for the first queue (by name) whose worker failed
    /// - AppError::InvalidState if the pool was already started
    pub async fn start_all(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(AppError::InvalidState(
                "worker pool already started".to_string(),
            ));
        }

        let workers: Vec<(QueueId, Arc<dyn EngineWorker>)> = self
            .entries()
            .iter()
            .map(|(queue, entry)| (queue.clone(), Arc::clone(&entry.worker)))
            .collect();

        info!(workers = workers.len(), "Starting workers");

        let results = join_all(workers.into_iter().map(|(queue, worker)| async move {
            let outcome = worker.start().await;
            (queue, outcome)
        }))
        .await;

        let mut first_failure = None;
        for (queue, outcome) in results {
            if let Err(e) = outcome {
                error!(queue = %queue, error = %e, "Worker failed to start");
                if first_failure.is_none() {
                    first_failure = Some(AppError::PoolStart { queue, source: e });
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Tear down all workers through the factory
    pub async fn shutdown(&self) -> Result<()> {
        self.factory.shutdown().await?;
        info!(workers = self.len(), "Workers shut down");
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn queues(&self) -> Vec<QueueId> {
        self.entries().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<PoolSnapshot> {
        self.entries()
            .iter()
            .map(|(queue, entry)| PoolSnapshot {
                queue: queue.clone(),
                workflow_types: entry.workflow_types.iter().cloned().collect(),
                activity_types: entry.activity_types.iter().cloned().collect(),
            })
            .collect()
    }
}
