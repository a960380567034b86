use crate::config::RuntimeConfig;
use crate::engine::Engine;
use crate::registry::{AlgorithmOutput, AlgorithmRegistry};
use parcore::{EngineError, EventBus, ExecutionEvent, GraphArg, Params};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Main entry point: a shared algorithm registry plus the engine that
/// runs whatever it resolves
pub struct ParallelRuntime {
    registry: Arc<AlgorithmRegistry>,
    engine: Engine,
    event_bus: Arc<EventBus>,
    config: RuntimeConfig,
}

impl ParallelRuntime {
    /// Create a new runtime with default settings and an empty registry
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::with_registry(Arc::new(AlgorithmRegistry::new()), config)
    }

    /// Create a new runtime around a pre-built registry
    pub fn with_registry(registry: Arc<AlgorithmRegistry>, config: RuntimeConfig) -> Self {
        let event_bus = Arc::new(EventBus::new(config.event_buffer_size));
        let engine = Engine::new(&config).with_event_bus(Arc::clone(&event_bus));
        tracing::debug!(
            "Runtime ready: {} workers, {} algorithms",
            engine.workers(),
            registry.list_algorithms().len()
        );

        Self {
            registry,
            engine,
            event_bus,
            config,
        }
    }

    /// Cap the worker count for subsequent calls. The CPU count still
    /// bounds it and the rest of the configuration is kept.
    pub fn set_workers(&mut self, workers: usize) -> Result<(), EngineError> {
        self.engine = Engine::capped(&self.config, workers)?
            .with_event_bus(Arc::clone(&self.event_bus));
        self.config.max_workers = workers;
        tracing::debug!("Worker cap set to {}, using {}", workers, self.engine.workers());
        Ok(())
    }

    pub fn registry(&self) -> &Arc<AlgorithmRegistry> {
        &self.registry
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Resolve `name` and run it on `graph`
    pub fn execute(
        &self,
        name: &str,
        graph: impl Into<GraphArg>,
        params: &Params,
    ) -> Result<AlgorithmOutput, EngineError> {
        let entry = self.registry.resolve(name)?;
        tracing::info!("Executing '{}' on {} workers", name, self.engine.workers());
        entry.invoke(&self.engine, graph.into(), params)
    }

    /// Subscribe to execution events
    pub fn subscribe_events(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.event_bus.subscribe()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

impl Default for ParallelRuntime {
    fn default() -> Self {
        Self::new()
    }
}
