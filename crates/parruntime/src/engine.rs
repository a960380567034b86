use crate::config::RuntimeConfig;
use crate::executor::{ParallelExecutor, ResultStream};
use crate::work::WorkUnit;
use parcore::{AlgorithmError, ChunkingPolicy, EngineError, EventBus};
use std::sync::Arc;
use std::time::Instant;

/// Execution context handed to every algorithm entry point.
///
/// Owns the worker count for the call and the executor that runs the
/// units. Cheap to clone.
#[derive(Clone)]
pub struct Engine {
    executor: ParallelExecutor,
}

impl Engine {
    pub fn new(config: &RuntimeConfig) -> Self {
        let executor = ParallelExecutor::new(config.worker_count())
            .with_buffer_multiplier(config.channel_buffer_multiplier);
        Self { executor }
    }

    /// Engine using at most `workers` threads, further capped by the CPU
    /// count.
    pub fn with_workers(workers: usize) -> Result<Self, EngineError> {
        Self::capped(&RuntimeConfig::default(), workers)
    }

    /// Engine for `config` with `max_workers` replaced by `cap`.
    pub fn capped(config: &RuntimeConfig, cap: usize) -> Result<Self, EngineError> {
        if cap < 1 {
            return Err(EngineError::InvalidArgument(format!(
                "worker count must be positive, got {}",
                cap
            )));
        }
        let config = RuntimeConfig {
            max_workers: cap,
            ..config.clone()
        };
        Ok(Self::new(&config))
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.executor = self.executor.with_event_bus(bus);
        self
    }

    pub fn workers(&self) -> usize {
        self.executor.workers()
    }

    pub fn executor(&self) -> &ParallelExecutor {
        &self.executor
    }

    /// Partition `items` for this engine's worker count.
    pub fn split<T>(&self, items: Vec<T>, policy: &ChunkingPolicy<T>) -> Result<Vec<Vec<T>>, EngineError> {
        policy.split(items, self.workers())
    }

    /// Run a shared precomputation on the calling thread. Nothing is
    /// dispatched when it fails.
    pub fn precompute<S, F>(&self, stage: &str, compute: F) -> Result<Arc<S>, EngineError>
    where
        F: FnOnce() -> Result<S, AlgorithmError>,
    {
        let started = Instant::now();
        match compute() {
            Ok(shared) => {
                tracing::debug!(
                    "Precompute '{}' finished in {}ms",
                    stage,
                    started.elapsed().as_millis()
                );
                Ok(Arc::new(shared))
            }
            Err(source) => {
                tracing::error!("Precompute '{}' failed: {}", stage, source);
                Err(EngineError::PartialPrecomputeFailure {
                    stage: stage.to_string(),
                    source,
                })
            }
        }
    }

    pub fn eager<R>(&self, label: &str, units: Vec<WorkUnit<R>>) -> Result<Vec<R>, EngineError>
    where
        R: Send + 'static,
    {
        self.executor.run_eager(label, units)
    }

    pub fn lazy<R>(&self, label: &str, units: Vec<WorkUnit<R>>) -> ResultStream<R>
    where
        R: Send + 'static,
    {
        self.executor.run_lazy(label, units)
    }

    /// Run one unit per chunk and fold the partial results in order.
    pub fn reduce<R, A, F>(
        &self,
        label: &str,
        units: Vec<WorkUnit<R>>,
        init: A,
        mut fold: F,
    ) -> Result<A, EngineError>
    where
        R: Send + 'static,
        F: FnMut(A, R) -> A,
    {
        let partials = self.eager(label, units)?;
        Ok(partials.into_iter().fold(init, |acc, part| fold(acc, part)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work::chunk_units;

    #[test]
    fn zero_workers_rejected() {
        assert!(matches!(
            Engine::with_workers(0),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn config_cap_limits_workers() {
        let config = RuntimeConfig {
            max_workers: 1,
            ..Default::default()
        };
        assert_eq!(Engine::new(&config).workers(), 1);
    }

    #[test]
    fn requested_workers_never_exceed_cpus() {
        let config = RuntimeConfig {
            channel_buffer_multiplier: 5,
            ..Default::default()
        };
        let engine = Engine::capped(&config, 4096).unwrap();
        assert_eq!(engine.workers(), num_cpus::get().min(4096));
        assert_eq!(engine.executor().buffer_multiplier(), 5);
        assert_eq!(Engine::with_workers(1).unwrap().workers(), 1);
    }

    #[test]
    fn failed_precompute_dispatches_nothing() {
        let engine = Engine::with_workers(2).unwrap();
        let err = engine
            .precompute::<u32, _>("potentials", || Err(AlgorithmError::NegativeCycle))
            .unwrap_err();
        match err {
            EngineError::PartialPrecomputeFailure { stage, source } => {
                assert_eq!(stage, "potentials");
                assert_eq!(source, AlgorithmError::NegativeCycle);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn split_then_reduce_sums_everything() {
        let engine = Engine::with_workers(3).unwrap();
        let items: Vec<u64> = (1..=100).collect();
        let chunks = engine.split(items, &ChunkingPolicy::Default).unwrap();
        let shared = engine.precompute("offset", || Ok(0u64)).unwrap();
        let units = chunk_units(chunks, shared, |offset, chunk| {
            Ok(chunk.iter().sum::<u64>() + offset)
        });
        let total = engine.reduce("sum", units, 0u64, |acc, part| acc + part).unwrap();
        assert_eq!(total, 5050);
    }
}
