//! Partitioning of ordered item collections into contiguous chunks.

use crate::EngineError;
use std::fmt;
use std::sync::Arc;

type CustomChunker<T> = dyn Fn(&[T]) -> Vec<Vec<T>> + Send + Sync;

/// How an entry point splits its item universe into work units.
pub enum ChunkingPolicy<T> {
    /// Even split: `max(len / workers, 1)` items per chunk
    Default,
    /// Caller-supplied partitioning. Coverage and disjointness of the
    /// returned chunks are not checked.
    Custom(Arc<CustomChunker<T>>),
}

impl<T> ChunkingPolicy<T> {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[T]) -> Vec<Vec<T>> + Send + Sync + 'static,
    {
        ChunkingPolicy::Custom(Arc::new(f))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ChunkingPolicy::Default)
    }

    /// Split `items` for `workers` workers according to this policy.
    pub fn split(&self, items: Vec<T>, workers: usize) -> Result<Vec<Vec<T>>, EngineError> {
        if workers < 1 {
            return Err(EngineError::InvalidArgument(format!(
                "worker count must be positive, got {}",
                workers
            )));
        }
        match self {
            ChunkingPolicy::Default => {
                let size = default_chunk_size(items.len(), workers)?;
                chunks(items, size)
            }
            ChunkingPolicy::Custom(f) => Ok(f(&items)),
        }
    }
}

impl<T> Default for ChunkingPolicy<T> {
    fn default() -> Self {
        ChunkingPolicy::Default
    }
}

impl<T> Clone for ChunkingPolicy<T> {
    fn clone(&self) -> Self {
        match self {
            ChunkingPolicy::Default => ChunkingPolicy::Default,
            ChunkingPolicy::Custom(f) => ChunkingPolicy::Custom(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for ChunkingPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkingPolicy::Default => f.write_str("Default"),
            ChunkingPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Chunk size of the default policy. Fewer items than workers gives size 1,
/// leaving the surplus workers idle.
pub fn default_chunk_size(len: usize, workers: usize) -> Result<usize, EngineError> {
    if workers < 1 {
        return Err(EngineError::InvalidArgument(format!(
            "worker count must be positive, got {}",
            workers
        )));
    }
    Ok((len / workers).max(1))
}

/// Split `items` into consecutive groups of `chunk_size`; the last group may
/// be shorter. One-pass iterators are drained into independent chunks.
pub fn chunks<I>(items: I, chunk_size: usize) -> Result<Vec<Vec<I::Item>>, EngineError>
where
    I: IntoIterator,
{
    if chunk_size < 1 {
        return Err(EngineError::InvalidArgument(format!(
            "chunk size must be positive, got {}",
            chunk_size
        )));
    }

    let mut out = Vec::new();
    let mut current = Vec::with_capacity(chunk_size);
    for item in items {
        current.push(item);
        if current.len() == chunk_size {
            out.push(std::mem::replace(&mut current, Vec::with_capacity(chunk_size)));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    Ok(out)
}
