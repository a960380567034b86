//! Core abstractions for the parallel graph engine
//!
//! This crate provides the fundamental types every other component depends
//! on: the host graph and its parallel adapter, chunking, parameters, errors
//! and execution events. It spawns no threads of its own.

pub mod chunk;
mod error;
pub mod events;
pub mod graph;
mod params;
mod value;

pub use chunk::{chunks, default_chunk_size, ChunkingPolicy};
pub use error::{AlgorithmError, EngineError, GraphError};
pub use events::*;
pub use graph::{
    convert_from, convert_to, Adjacency, EdgeAttrs, EdgeIndex, Graph, GraphArg, GraphData,
    GraphView, NodeIndex, ParallelGraph, Weight, WeightFn,
};
pub use params::Params;
pub use value::Value;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
