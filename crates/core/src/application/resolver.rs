// Stub Resolver - the single queue choke point for every remote call

use super::lifecycle::RegistryLifecycle;
use crate::config::StewardConfig;
use crate::domain::derive_queue_name;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// Picks the task queue for a workflow start, activity call or child workflow
///
/// Precedence, highest first:
/// 1. explicit queue supplied at the call site
/// 2. registry binding (once the lifecycle has published its registry)
/// 3. convention-derived name, if auto-naming is enabled
/// 4. the configured default queue
///
/// Holds only a weak reference to the lifecycle; if the lifecycle is gone
/// resolution continues with levels 3 and 4. Never fails.
#[derive(Clone)]
pub struct StubResolver {
    lifecycle: Weak<RegistryLifecycle>,
    auto_naming: bool,
    default_queue: String,
}

impl StubResolver {
    pub fn new(lifecycle: &Arc<RegistryLifecycle>) -> Self {
        let config = lifecycle.config();
        Self {
            lifecycle: Arc::downgrade(lifecycle),
            auto_naming: config.auto_naming,
            default_queue: config.default_queue.clone(),
        }
    }

    /// Resolver without a registry (convention and default only)
    pub fn detached(config: &StewardConfig) -> Self {
        Self {
            lifecycle: Weak::new(),
            auto_naming: config.auto_naming,
            default_queue: config.default_queue.clone(),
        }
    }

    pub fn resolve_for_call(&self, type_name: &str, explicit_queue: Option<&str>) -> String {
        if let Some(queue) = explicit_queue.filter(|q| !q.trim().is_empty()) {
            debug!(type_name = %type_name, queue = %queue, "Using explicit queue");
            return queue.to_string();
        }

        if let Some(lifecycle) = self.lifecycle.upgrade() {
            if let Some(queue) = lifecycle.lookup(type_name) {
                debug!(type_name = %type_name, queue = %queue, "Resolved queue from registry");
                return queue.to_string();
            }
        }

        if self.auto_naming {
            let queue = derive_queue_name(type_name);
            debug!(type_name = %type_name, queue = %queue, "Derived queue from type name");
            return queue;
        }

        info!(
            type_name = %type_name,
            queue = %self.default_queue,
            "No queue binding for type, using default queue"
        );
        self.default_queue.clone()
    }

    pub fn default_queue(&self) -> &str {
        &self.default_queue
    }
}
