use parcore::AlgorithmError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Outcome of running one work unit
pub type UnitResult<R> = Result<R, AlgorithmError>;

/// A deferred, independently executable computation.
///
/// Units capture everything they need up front (graph handle, weight
/// function, precomputed tables) as owned or `Arc`-shared read-only values.
pub struct WorkUnit<R> {
    task: Box<dyn FnOnce() -> UnitResult<R> + Send + 'static>,
}

impl<R> WorkUnit<R> {
    pub fn new<F>(task: F) -> Self
    where
        F: FnOnce() -> UnitResult<R> + Send + 'static,
    {
        Self {
            task: Box::new(task),
        }
    }

    /// Run the unit, turning a panic into [`AlgorithmError::Panicked`].
    pub fn run(self) -> UnitResult<R> {
        match panic::catch_unwind(AssertUnwindSafe(self.task)) {
            Ok(outcome) => outcome,
            Err(payload) => Err(AlgorithmError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// One unit per chunk: `process(&shared, chunk)`.
pub fn chunk_units<T, S, R, F>(chunks: Vec<Vec<T>>, shared: Arc<S>, process: F) -> Vec<WorkUnit<R>>
where
    T: Send + 'static,
    S: Send + Sync + 'static + ?Sized,
    R: 'static,
    F: Fn(&S, Vec<T>) -> UnitResult<R> + Send + Sync + 'static,
{
    let process = Arc::new(process);
    chunks
        .into_iter()
        .map(|chunk| {
            let shared = Arc::clone(&shared);
            let process = Arc::clone(&process);
            WorkUnit::new(move || process(&*shared, chunk))
        })
        .collect()
}

/// One unit per item: `process(&shared, item)`. Used where per-item cost
/// dominates dispatch overhead.
pub fn item_units<T, S, R, F>(items: Vec<T>, shared: Arc<S>, process: F) -> Vec<WorkUnit<R>>
where
    T: Send + 'static,
    S: Send + Sync + 'static + ?Sized,
    R: 'static,
    F: Fn(&S, T) -> UnitResult<R> + Send + Sync + 'static,
{
    let process = Arc::new(process);
    items
        .into_iter()
        .map(|item| {
            let shared = Arc::clone(&shared);
            let process = Arc::clone(&process);
            WorkUnit::new(move || process(&*shared, item))
        })
        .collect()
}
