//! Parallel execution runtime
//!
//! This crate provides the worker pool that runs work units, the engine
//! context handed to algorithms, the algorithm registry and the runtime
//! that ties them together.

mod config;
mod engine;
mod executor;
mod registry;
mod runtime;
pub mod work;

pub use config::RuntimeConfig;
pub use engine::Engine;
pub use executor::{ExecutionMode, FlattenChunks, ParallelExecutor, ResultStream, Results};
pub use registry::{
    AlgorithmEntry, AlgorithmMetadata, AlgorithmOutput, AlgorithmRegistry, ParamDefinition,
    ValueStream,
};
pub use runtime::ParallelRuntime;
pub use work::{chunk_units, item_units, UnitResult, WorkUnit};
