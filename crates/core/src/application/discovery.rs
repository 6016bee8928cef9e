// Discovery - single startup pass binding components to queues
//
// Order matters: manual queue entries are ingested before auto-discovery so
// that first-writer-wins in QueueRegistry gives operator config precedence.

use super::registry::QueueRegistry;
use super::worker_pool::WorkerPool;
use crate::config::StewardConfig;
use crate::domain::{derive_queue_name, Candidate, QueueConfig, Role};
use crate::error::{AppError, Result};
use crate::port::ComponentSource;
use tracing::{debug, info, warn};

/// Counters for one discovery pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Types bound from manual queue entries
    pub manual: usize,
    /// Components bound by auto-discovery
    pub discovered: usize,
    /// Components skipped (already bound, out of scope, unclassified, gated off)
    pub skipped: usize,
    /// Bind attempts refused because the type was already bound
    pub rebinds: usize,
}

/// Runs the discovery pass against a fresh registry
pub struct DiscoveryCoordinator<'a> {
    config: &'a StewardConfig,
    source: &'a dyn ComponentSource,
    pool: &'a WorkerPool,
    registry: QueueRegistry,
    report: DiscoveryReport,
}

impl<'a> DiscoveryCoordinator<'a> {
    pub fn new(
        config: &'a StewardConfig,
        source: &'a dyn ComponentSource,
        pool: &'a WorkerPool,
    ) -> Self {
        Self {
            config,
            source,
            pool,
            registry: QueueRegistry::new(),
            report: DiscoveryReport::default(),
        }
    }

    /// Ingest manual config, then auto-discover; returns the populated registry
    ///
    /// # Errors
    /// - AppError::MissingComponent if a configured activity has no instance
    /// - AppError::Engine if a worker cannot be created or rejects a registration
    pub fn run(mut self) -> Result<(QueueRegistry, DiscoveryReport)> {
        info!(
            manual_queues = self.config.queues.len(),
            auto_naming = self.config.auto_naming,
            auto_pilot = self.config.auto_pilot,
            "Starting discovery"
        );

        let config = self.config;
        for entry in &config.queues {
            self.ingest_manual(entry)?;
        }

        if config.auto_discovery_enabled() {
            for candidate in self.source.candidates() {
                self.discover(candidate)?;
            }
        } else {
            debug!("Auto-discovery disabled (auto_naming and auto_pilot are off)");
        }

        info!(
            bindings = self.registry.len(),
            workers = self.pool.len(),
            manual = self.report.manual,
            discovered = self.report.discovered,
            skipped = self.report.skipped,
            "Discovery complete"
        );
        Ok((self.registry, self.report))
    }

    fn ingest_manual(&mut self, entry: &QueueConfig) -> Result<()> {
        let queue = entry.name.as_str();
        // Every manual entry gets its worker, even with nothing to register
        self.pool.get_or_create(queue)?;

        for type_name in &entry.workflows {
            let found = self
                .source
                .lookup(type_name)
                .filter(|c| c.role() == Some(Role::Workflow));
            if found.is_none() {
                warn!(
                    workflow = %type_name,
                    queue = %queue,
                    "No workflow component matches manual entry, registering the name as written"
                );
            }
            let implementation = found
                .as_ref()
                .map_or(type_name.as_str(), Candidate::type_name)
                .to_string();
            let interfaces = found
                .as_ref()
                .map(|c| c.interfaces().to_vec())
                .unwrap_or_default();

            if self.bind_all(type_name, &implementation, &interfaces, queue, Role::Workflow) {
                self.pool.register_workflow(queue, &implementation)?;
                self.report.manual += 1;
            }
        }

        for type_name in &entry.activities {
            let component = match self.source.lookup(type_name) {
                Some(Candidate::Activity(component)) => component,
                _ => {
                    return Err(AppError::MissingComponent {
                        type_name: type_name.clone(),
                        queue: queue.to_string(),
                    })
                }
            };

            if self.bind_all(
                type_name,
                &component.implementation,
                &component.interfaces,
                queue,
                Role::Activity,
            ) {
                self.pool
                    .register_activity(queue, &component.implementation, component.instance)?;
                self.report.manual += 1;
            }
        }

        Ok(())
    }

    fn discover(&mut self, candidate: Candidate) -> Result<()> {
        let config = self.config;
        if let Some(base) = config.scan_scope() {
            if !candidate.is_within(base) {
                debug!(component = %candidate.type_name(), base = %base, "Outside scan scope");
                self.report.skipped += 1;
                return Ok(());
            }
        }

        if self.registry.contains(candidate.type_name()) {
            debug!(component = %candidate.type_name(), "Already bound, skipping auto-discovery");
            self.report.skipped += 1;
            return Ok(());
        }

        match candidate {
            Candidate::Workflow(workflow) => {
                // Callers address workflows by interface, so name the queue after it
                let naming_source = workflow
                    .interfaces
                    .first()
                    .unwrap_or(&workflow.implementation);
                let queue = self.queue_for(naming_source);

                self.bind_all(
                    &workflow.implementation,
                    &workflow.implementation,
                    &workflow.interfaces,
                    &queue,
                    Role::Workflow,
                );
                self.pool.register_workflow(&queue, &workflow.implementation)?;
                info!(workflow = %workflow.implementation, queue = %queue, "Auto-registered workflow");
                self.report.discovered += 1;
            }
            Candidate::Activity(activity) if config.auto_pilot => {
                let queue = self.queue_for(&activity.implementation);

                self.bind_all(
                    &activity.implementation,
                    &activity.implementation,
                    &activity.interfaces,
                    &queue,
                    Role::Activity,
                );
                self.pool
                    .register_activity(&queue, &activity.implementation, activity.instance)?;
                info!(activity = %activity.implementation, queue = %queue, "Auto-registered activity");
                self.report.discovered += 1;
            }
            Candidate::Activity(activity) => {
                debug!(activity = %activity.implementation, "auto_pilot off, activity not discovered");
                self.report.skipped += 1;
            }
            Candidate::Unclassified(name) => {
                debug!(component = %name, "Neither workflow nor activity, ignoring");
                self.report.skipped += 1;
            }
        }

        Ok(())
    }

    /// Convention name when auto-naming is on, otherwise the default queue
    fn queue_for(&self, type_name: &str) -> String {
        if self.config.auto_naming {
            derive_queue_name(type_name)
        } else {
            self.config.default_queue.clone()
        }
    }

    /// Bind the requested name, the implementation and its interfaces
    ///
    /// Returns whether the primary name was newly bound.
    fn bind_all(
        &mut self,
        requested: &str,
        implementation: &str,
        interfaces: &[String],
        queue: &str,
        role: Role,
    ) -> bool {
        let primary = self.bind(requested, queue, role);
        if !primary {
            return false;
        }

        let aliases = std::iter::once(implementation)
            .chain(interfaces.iter().map(String::as_str))
            .filter(|name| *name != requested);
        for alias in aliases {
            if self.registry.resolve(alias) != Some(queue) {
                self.bind(alias, queue, role);
            }
        }
        true
    }

    fn bind(&mut self, type_name: &str, queue: &str, role: Role) -> bool {
        if self.registry.bind(type_name, queue, role) {
            debug!(type_name = %type_name, queue = %queue, role = %role, "Bound type");
            return true;
        }

        self.report.rebinds += 1;
        warn!(
            type_name = %type_name,
            requested_queue = %queue,
            bound_queue = ?self.registry.resolve(type_name),
            "Type already bound, keeping first binding"
        );
        false
    }
}
