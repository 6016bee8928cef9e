//! Steward - Worker Host Entry Point
//! Discovers components, starts one worker per task queue, serves until Ctrl+C

mod demo;
mod settings;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use steward_core::port::WorkflowEngine;
use steward_core::{RegistryLifecycle, Steward, VERSION};
use steward_infra_memory::InMemoryEngine;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

fn init_logging() -> Result<()> {
    let log_format = std::env::var("STEWARD_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("steward=info"))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    init_logging()?;
    info!("Steward v{} starting...", VERSION);

    // 2. Load configuration
    let config = settings::load()?;
    if !config.enabled {
        info!("Steward disabled by configuration; exiting");
        return Ok(());
    }
    info!(
        engine_target = %config.target,
        namespace = %config.namespace,
        default_queue = %config.default_queue,
        auto_naming = config.auto_naming,
        auto_pilot = config.auto_pilot,
        manual_queues = config.queues.len(),
        "Configuration loaded"
    );

    // 3. Wire adapters (DI)
    let engine = InMemoryEngine::from_config(&config);
    let source = Arc::new(demo::pizza_shop());
    let lifecycle = Arc::new(
        RegistryLifecycle::new(config, &engine, source)
            .context("Failed to claim the engine worker factory")?,
    );

    // 4. Discover and start worker pools
    lifecycle.start().await.context("Steward startup failed")?;
    for binding in lifecycle.bindings() {
        info!(
            type_name = %binding.type_name,
            queue = %binding.queue,
            role = %binding.role,
            "Bound"
        );
    }

    let steward = Steward::new(&lifecycle, engine.client());
    let sample = steward.new_stub("PizzaWorkflow").build()?;
    info!(
        queue = ?sample.task_queue,
        workflow_id = ?sample.workflow_id,
        "Sample PizzaWorkflow stub resolved"
    );

    info!(workers = lifecycle.worker_count(), "System ready");
    info!("Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Stopping workers...");

    // 6. Graceful shutdown
    match tokio::time::timeout(SHUTDOWN_TIMEOUT, lifecycle.stop()).await {
        Ok(result) => result.context("Worker shutdown failed")?,
        Err(_) => warn!(
            timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
            "Worker shutdown timed out"
        ),
    }

    info!("Shutdown complete.");
    Ok(())
}
