//! Application state wiring the engine together.
//!
//! AppState holds the registry, logger, executor, adapters, and public gate
//! used by both CLI commands and REST API handlers.

use std::sync::Arc;

use anyhow::Context;

use abacus_core::adapter::AdapterRegistry;
use abacus_core::executor::Executor;
use abacus_core::gate::PublicGate;
use abacus_core::logger::ExecutionLogger;
use abacus_core::registry::Registry;
use abacus_types::config::AbacusConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub logger: Arc<ExecutionLogger>,
    pub executor: Arc<Executor>,
    pub adapters: Arc<AdapterRegistry>,
    pub gate: Arc<PublicGate>,
    pub config: Arc<AbacusConfig>,
}

impl AppState {
    /// Build the engine and register the built-in skill catalog.
    pub fn init(config: AbacusConfig) -> anyhow::Result<Self> {
        let registry = Arc::new(Registry::new());
        abacus_skills::register_builtin(&registry).context("registering built-in skills")?;

        for id in config.public.allowed.iter().filter(|id| !registry.contains(id)) {
            tracing::warn!(skill_id = %id, "public allow-list names an unregistered skill");
        }

        let logger = Arc::new(ExecutionLogger::new(config.logger.capacity));
        let executor = Arc::new(Executor::new(Arc::clone(&registry), Arc::clone(&logger)));

        Ok(Self {
            registry,
            logger,
            executor,
            adapters: Arc::new(abacus_skills::builtin_adapters()),
            gate: Arc::new(PublicGate::from_config(&config.public)),
            config: Arc::new(config),
        })
    }
}
