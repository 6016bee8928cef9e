// Registry Lifecycle - owns QueueRegistry and WorkerPool for one engine connection

use super::discovery::{DiscoveryCoordinator, DiscoveryReport};
use super::registry::QueueRegistry;
use super::worker_pool::{PoolSnapshot, WorkerPool};
use crate::config::StewardConfig;
use crate::domain::{LifecycleState, TypeBinding};
use crate::error::{AppError, Result};
use crate::port::{ComponentSource, EngineError, WorkflowEngine};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

/// Drives discovery -> start -> running -> shutdown
///
/// The registry is published (write-once) only when `Running` is reached, so
/// resolver reads never observe a partially populated registry. After stop
/// the registry stays readable as a drained artifact.
pub struct RegistryLifecycle {
    config: StewardConfig,
    source: Arc<dyn ComponentSource>,
    pool: WorkerPool,
    connection: String,
    registry: OnceLock<QueueRegistry>,
    report: OnceLock<DiscoveryReport>,
    state: watch::Sender<LifecycleState>,
    // Serializes start/stop; a lifecycle runs at most one discovery pass
    transition: Mutex<()>,
    attempted: AtomicBool,
    // Set once the lifecycle has left service for good (aborted or stopped)
    finished: AtomicBool,
}

impl RegistryLifecycle {
    /// Create the lifecycle, claiming the engine connection's worker factory
    ///
    /// # Errors
    /// - AppError::Config if the configuration is invalid
    /// - AppError::Conflict if another lifecycle already owns this connection
    pub fn new(
        config: StewardConfig,
        engine: &dyn WorkflowEngine,
        source: Arc<dyn ComponentSource>,
    ) -> Result<Self> {
        config.validate()?;

        let connection = engine.connection();
        let factory = engine.claim_worker_factory().map_err(|e| match e {
            EngineError::FactoryClaimed(conn) => AppError::Conflict(format!(
                "a registry lifecycle is already attached to engine connection {}",
                conn
            )),
            other => AppError::Engine(other),
        })?;

        info!(connection = %connection, default_queue = %config.default_queue, "Registry lifecycle created");

        let (state, _) = watch::channel(LifecycleState::Stopped);
        Ok(Self {
            config,
            source,
            pool: WorkerPool::new(factory),
            connection,
            registry: OnceLock::new(),
            report: OnceLock::new(),
            state,
            transition: Mutex::new(()),
            attempted: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        })
    }

    fn advance(&self, to: LifecycleState) -> Result<()> {
        let from = self.state();
        let next = from.transition(to)?;
        self.state.send_replace(next);
        debug!(from = %from, to = %next, "Lifecycle transition");
        Ok(())
    }

    /// Run discovery and start every worker
    ///
    /// Any failure aborts the whole sequence: workers already created are
    /// torn down, the registry is never published and the state returns to
    /// `Stopped`.
    ///
    /// # Errors
    /// - AppError::InvalidState if start was already attempted
    /// - AppError::MissingComponent / AppError::Engine from discovery
    /// - AppError::PoolStart if a worker fails to start
    pub async fn start(&self) -> Result<()> {
        let _guard = self.transition.lock().await;

        if self.attempted.swap(true, Ordering::SeqCst) {
            return Err(AppError::InvalidState(
                "discovery already ran; a lifecycle cannot be restarted".to_string(),
            ));
        }

        info!(connection = %self.connection, "Starting worker registry...");
        self.advance(LifecycleState::Discovering)?;

        let discovered =
            DiscoveryCoordinator::new(&self.config, self.source.as_ref(), &self.pool).run();
        let (registry, report) = match discovered {
            Ok(found) => found,
            Err(e) => return Err(self.abort(e).await),
        };

        self.advance(LifecycleState::Starting)?;
        if let Err(e) = self.pool.start_all().await {
            return Err(self.abort(e).await);
        }

        let bindings = registry.len();
        if self.registry.set(registry).is_err() {
            return Err(AppError::Internal("registry published twice".to_string()));
        }
        let _ = self.report.set(report);
        self.advance(LifecycleState::Running)?;

        info!(
            workers = self.pool.len(),
            bindings = bindings,
            "Workers started successfully"
        );
        Ok(())
    }

    async fn abort(&self, cause: AppError) -> AppError {
        error!(error = %cause, state = %self.state(), "Startup aborted");

        if let Err(e) = self.pool.shutdown().await {
            warn!(error = %e, "Shutdown after failed startup also failed");
        }
        self.finished.store(true, Ordering::SeqCst);
        self.state.send_replace(LifecycleState::Stopped);
        cause
    }

    /// Tear down every worker
    ///
    /// No-op if not running. The registry remains readable afterwards.
    pub async fn stop(&self) -> Result<()> {
        let _guard = self.transition.lock().await;

        if self.state() != LifecycleState::Running {
            debug!(state = %self.state(), "Stop requested while not running, ignoring");
            return Ok(());
        }

        info!("Stopping worker registry...");
        self.advance(LifecycleState::Stopping)?;
        let outcome = self.pool.shutdown().await;
        self.finished.store(true, Ordering::SeqCst);
        self.advance(LifecycleState::Stopped)?;

        match &outcome {
            Ok(()) => info!("Worker registry stopped"),
            Err(e) => error!(error = %e, "Worker shutdown failed"),
        }
        outcome
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state().is_serving()
    }

    /// Watch lifecycle state changes
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Wait until `Running`, failing if startup aborted or the lifecycle stopped
    pub async fn wait_until_running(&self) -> Result<()> {
        let mut rx = self.state.subscribe();
        let settled = *rx
            .wait_for(|state| match state {
                LifecycleState::Discovering | LifecycleState::Starting => false,
                LifecycleState::Stopped => self.finished.load(Ordering::SeqCst),
                LifecycleState::Running | LifecycleState::Stopping => true,
            })
            .await
            .map_err(|_| AppError::Internal("lifecycle state channel closed".to_string()))?;

        match settled {
            LifecycleState::Running => Ok(()),
            other => Err(AppError::InvalidState(format!(
                "lifecycle is {} and not serving",
                other
            ))),
        }
    }

    /// Registry lookup; None until the registry is published
    pub fn lookup(&self, type_name: &str) -> Option<&str> {
        self.registry.get()?.resolve(type_name)
    }

    /// Published registry, if discovery has completed successfully
    pub fn registry(&self) -> Option<&QueueRegistry> {
        self.registry.get()
    }

    pub fn bindings(&self) -> Vec<TypeBinding> {
        self.registry
            .get()
            .map(QueueRegistry::bindings)
            .unwrap_or_default()
    }

    pub fn discovery_report(&self) -> Option<&DiscoveryReport> {
        self.report.get()
    }

    pub fn pool_snapshot(&self) -> Vec<PoolSnapshot> {
        self.pool.snapshot()
    }

    pub fn worker_count(&self) -> usize {
        self.pool.len()
    }

    pub fn config(&self) -> &StewardConfig {
        &self.config
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candidate, QueueConfig};
    use crate::port::engine::mocks::FakeEngine;

    fn components() -> Arc<dyn ComponentSource> {
        Arc::new(vec![
            Candidate::workflow("PizzaWorkflowImpl", ["PizzaWorkflow"]),
            Candidate::activity(
                "KitchenActivitiesImpl",
                ["KitchenActivities"],
                Arc::new(()),
            ),
        ])
    }

    fn kitchen_config() -> StewardConfig {
        StewardConfig::default()
            .with_queue(QueueConfig::new("KITCHEN_QUEUE").with_activity("KitchenActivitiesImpl"))
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let engine = FakeEngine::new();
        let lifecycle = RegistryLifecycle::new(kitchen_config(), &engine, components()).unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Stopped);
        assert_eq!(lifecycle.lookup("PizzaWorkflow"), None, "not published before start");

        lifecycle.start().await.unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Running);
        assert_eq!(lifecycle.lookup("KitchenActivitiesImpl"), Some("KITCHEN_QUEUE"));
        assert_eq!(lifecycle.lookup("PizzaWorkflow"), Some("PIZZA_WORKFLOW_QUEUE"));
        assert_eq!(lifecycle.worker_count(), 2);
        assert!(engine.factory().worker("KITCHEN_QUEUE").unwrap().is_started());

        lifecycle.stop().await.unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Stopped);
        assert_eq!(engine.factory().shutdown_count(), 1);
        // drained registry still answers
        assert_eq!(lifecycle.lookup("PizzaWorkflow"), Some("PIZZA_WORKFLOW_QUEUE"));
    }

    #[tokio::test]
    async fn test_second_lifecycle_on_same_connection_rejected() {
        let engine = FakeEngine::new();
        let _first = RegistryLifecycle::new(StewardConfig::default(), &engine, components()).unwrap();
        let second = RegistryLifecycle::new(StewardConfig::default(), &engine, components());
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_pool_start_failure_aborts_startup() {
        let engine = FakeEngine::new();
        engine.factory().fail_start_on("PIZZA_WORKFLOW_QUEUE");
        let lifecycle = RegistryLifecycle::new(kitchen_config(), &engine, components()).unwrap();

        let err = lifecycle.start().await.unwrap_err();
        assert!(matches!(err, AppError::PoolStart { ref queue, .. } if queue == "PIZZA_WORKFLOW_QUEUE"));
        assert!(err.is_startup_fatal());
        assert_eq!(lifecycle.state(), LifecycleState::Stopped);
        assert!(lifecycle.registry().is_none(), "registry must not be published");
        assert_eq!(engine.factory().shutdown_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_component_aborts_before_starting() {
        let engine = FakeEngine::new();
        let config = StewardConfig::default()
            .with_queue(QueueConfig::new("BILLING_QUEUE").with_activity("BillingActivitiesImpl"));
        let lifecycle = RegistryLifecycle::new(config, &engine, components()).unwrap();

        let err = lifecycle.start().await.unwrap_err();
        assert!(matches!(err, AppError::MissingComponent { .. }));
        assert_eq!(lifecycle.state(), LifecycleState::Stopped);
        assert!(engine.factory().worker("BILLING_QUEUE").is_some_and(|w| !w.is_started()));
    }

    #[tokio::test]
    async fn test_restart_is_rejected() {
        let engine = FakeEngine::new();
        let lifecycle = RegistryLifecycle::new(kitchen_config(), &engine, components()).unwrap();
        lifecycle.start().await.unwrap();
        lifecycle.stop().await.unwrap();

        let err = lifecycle.start().await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_stop_when_not_running_is_noop() {
        let engine = FakeEngine::new();
        let lifecycle = RegistryLifecycle::new(kitchen_config(), &engine, components()).unwrap();
        lifecycle.stop().await.unwrap();
        assert_eq!(engine.factory().shutdown_count(), 0);
    }

    #[tokio::test]
    async fn test_wait_until_running() {
        let engine = FakeEngine::new();
        let lifecycle =
            Arc::new(RegistryLifecycle::new(kitchen_config(), &engine, components()).unwrap());

        let waiter = {
            let lifecycle = Arc::clone(&lifecycle);
            tokio::spawn(async move { lifecycle.wait_until_running().await })
        };
        lifecycle.start().await.unwrap();

        assert!(waiter.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_wait_until_running_reports_failed_start() {
        let engine = FakeEngine::new();
        engine.factory().fail_start_on("KITCHEN_QUEUE");
        let lifecycle = RegistryLifecycle::new(kitchen_config(), &engine, components()).unwrap();

        assert!(lifecycle.start().await.is_err());
        assert!(lifecycle.wait_until_running().await.is_err());
    }

    #[test]
    fn test_invalid_config_rejected_before_claiming() {
        let engine = FakeEngine::new();
        let config = StewardConfig {
            default_queue: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            RegistryLifecycle::new(config, &engine, components()),
            Err(AppError::Config(_))
        ));
        // connection still free
        assert!(RegistryLifecycle::new(StewardConfig::default(), &engine, components()).is_ok());
    }
}
