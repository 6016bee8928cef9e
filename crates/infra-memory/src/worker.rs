// In-memory worker: holds registrations and runs a serving loop per queue

use crate::constants::POLL_INTERVAL;
use crate::shutdown::StopToken;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use steward_core::domain::ActivityObject;
use steward_core::port::{EngineError, EngineWorker};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Worker serving one task queue
pub struct MemoryWorker {
    queue: String,
    workflows: Mutex<Vec<String>>,
    activities: Mutex<BTreeMap<String, ActivityObject>>,
    token: StopToken,
    fail_start: bool,
    started: AtomicBool,
    polls: Arc<AtomicU64>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryWorker {
    pub(crate) fn new(queue: impl Into<String>, token: StopToken, fail_start: bool) -> Self {
        Self {
            queue: queue.into(),
            workflows: Mutex::new(Vec::new()),
            activities: Mutex::new(BTreeMap::new()),
            token,
            fail_start,
            started: AtomicBool::new(false),
            polls: Arc::new(AtomicU64::new(0)),
            handle: Mutex::new(None),
        }
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Registered workflow types, in registration order
    pub fn workflow_types(&self) -> Vec<String> {
        locked(&self.workflows).clone()
    }

    /// Registered activity types, sorted
    pub fn activity_types(&self) -> Vec<String> {
        locked(&self.activities).keys().cloned().collect()
    }

    pub fn activity_instance(&self, type_name: &str) -> Option<ActivityObject> {
        locked(&self.activities).get(type_name).cloned()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Number of idle polls performed by the serving loop
    pub fn poll_count(&self) -> u64 {
        self.polls.load(Ordering::Relaxed)
    }

    /// Wait for the serving loop to exit
    pub(crate) async fn join(&self) {
        let handle = locked(&self.handle).take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    fn reject_if_started(&self, type_name: &str) -> Result<(), EngineError> {
        if self.is_started() {
            return Err(EngineError::Rejected(format!(
                "{} registered after worker for queue '{}' started",
                type_name, self.queue
            )));
        }
        Ok(())
    }
}

async fn serve(queue: String, mut token: StopToken, polls: Arc<AtomicU64>) {
    info!(queue = %queue, "Worker serving");
    loop {
        if token.is_stopped() {
            break;
        }
        tokio::select! {
            _ = sleep(POLL_INTERVAL) => {
                polls.fetch_add(1, Ordering::Relaxed);
            }
            _ = token.stopped() => {
                debug!(queue = %queue, "Worker interrupted during idle");
                break;
            }
        }
    }
    info!(queue = %queue, "Worker stopped");
}

#[async_trait]
impl EngineWorker for MemoryWorker {
    fn register_workflow_type(&self, type_name: &str) -> Result<(), EngineError> {
        self.reject_if_started(type_name)?;
        let mut workflows = locked(&self.workflows);
        if !workflows.iter().any(|w| w == type_name) {
            workflows.push(type_name.to_string());
        }
        Ok(())
    }

    fn register_activity_instance(
        &self,
        type_name: &str,
        instance: ActivityObject,
    ) -> Result<(), EngineError> {
        self.reject_if_started(type_name)?;
        locked(&self.activities).insert(type_name.to_string(), instance);
        Ok(())
    }

    async fn start(&self) -> Result<(), EngineError> {
        if self.fail_start {
            return Err(EngineError::Unavailable(format!(
                "worker for queue '{}' could not reach the engine",
                self.queue
            )));
        }
        if self.token.is_stopped() {
            return Err(EngineError::Unavailable("engine is shut down".to_string()));
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let handle = tokio::spawn(serve(
            self.queue.clone(),
            self.token.clone(),
            Arc::clone(&self.polls),
        ));
        *locked(&self.handle) = Some(handle);
        Ok(())
    }
}
