use crate::work::{UnitResult, WorkUnit};
use crossbeam::channel::{bounded, unbounded, Receiver, Sender};
use parcore::{EngineError, EventBus, RunEmitter};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

/// How results are handed back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Block until every unit finishes and return the ordered results
    Eager,
    /// Return a stream that yields results in submission order on demand
    Lazy,
}

/// Results of one executor run
pub enum Results<R> {
    Eager(Vec<R>),
    Lazy(ResultStream<R>),
}

impl<R> Results<R>
where
    R: Send + 'static,
{
    /// Materialise either form into an ordered vector.
    pub fn into_vec(self) -> Result<Vec<R>, EngineError> {
        match self {
            Results::Eager(values) => Ok(values),
            Results::Lazy(stream) => stream.collect(),
        }
    }
}

/// Runs work units across a fixed number of worker threads.
///
/// Result order always matches submission order. A single worker (or a
/// single unit) runs on the calling thread without spawning.
#[derive(Clone)]
pub struct ParallelExecutor {
    workers: usize,
    buffer_multiplier: usize,
    event_bus: Option<Arc<EventBus>>,
}

impl ParallelExecutor {
    /// Executor with `workers` threads, clamped to at least one.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            buffer_multiplier: 2,
            event_bus: None,
        }
    }

    pub fn try_new(workers: usize) -> Result<Self, EngineError> {
        if workers < 1 {
            return Err(EngineError::InvalidArgument(format!(
                "worker count must be positive, got {}",
                workers
            )));
        }
        Ok(Self::new(workers))
    }

    /// Lazy-mode read-ahead is `workers * multiplier` results.
    pub fn with_buffer_multiplier(mut self, multiplier: usize) -> Self {
        self.buffer_multiplier = multiplier.max(1);
        self
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn buffer_multiplier(&self) -> usize {
        self.buffer_multiplier
    }

    pub fn run<R>(
        &self,
        label: &str,
        units: Vec<WorkUnit<R>>,
        mode: ExecutionMode,
    ) -> Result<Results<R>, EngineError>
    where
        R: Send + 'static,
    {
        match mode {
            ExecutionMode::Eager => self.run_eager(label, units).map(Results::Eager),
            ExecutionMode::Lazy => Ok(Results::Lazy(self.run_lazy(label, units))),
        }
    }

    /// Run every unit and return the results in submission order.
    ///
    /// On failure no further units are dispatched, the ones already running
    /// finish, and the failure with the lowest submission index is returned.
    pub fn run_eager<R>(&self, label: &str, units: Vec<WorkUnit<R>>) -> Result<Vec<R>, EngineError>
    where
        R: Send + 'static,
    {
        let total = units.len();
        let emitter = self.emitter();
        let started = Instant::now();
        let workers = self.workers.min(total).max(1);

        tracing::info!(
            "Starting eager run '{}': {} units on {} workers",
            label,
            total,
            workers
        );
        emitter.run_started(label, total, workers, false);

        let outcome = if workers == 1 {
            run_inline(units, &emitter)
        } else {
            let pool = WorkerPool::spawn(units, workers, self.channel_capacity(), emitter.clone());
            pool.drain()
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        emitter.run_completed(outcome.is_ok(), duration_ms);
        match &outcome {
            Ok(_) => tracing::info!("Eager run '{}' completed in {}ms", label, duration_ms),
            Err(e) => tracing::error!("Eager run '{}' failed after {}ms: {}", label, duration_ms, e),
        }
        outcome
    }

    /// Start the units and return a stream over their results.
    ///
    /// With more than one worker the first `workers * multiplier` units
    /// start immediately in the background, and each result the consumer
    /// reads releases one more.
    pub fn run_lazy<R>(&self, label: &str, units: Vec<WorkUnit<R>>) -> ResultStream<R>
    where
        R: Send + 'static,
    {
        let total = units.len();
        let emitter = self.emitter();
        let workers = self.workers.min(total).max(1);

        tracing::info!(
            "Starting lazy run '{}': {} units on {} workers",
            label,
            total,
            workers
        );
        emitter.run_started(label, total, workers, true);

        let source = if workers == 1 {
            Source::Inline(units.into_iter())
        } else {
            Source::Pool(WorkerPool::spawn(
                units,
                workers,
                self.channel_capacity(),
                emitter.clone(),
            ))
        };

        ResultStream {
            source,
            label: label.to_string(),
            emitter,
            started: Instant::now(),
            next_index: 0,
            total,
            finished: false,
            failed: false,
        }
    }

    fn channel_capacity(&self) -> usize {
        self.workers * self.buffer_multiplier
    }

    fn emitter(&self) -> RunEmitter {
        match &self.event_bus {
            Some(bus) => bus.create_emitter(),
            None => RunEmitter::detached(),
        }
    }
}

fn run_unit<R>(index: usize, unit: WorkUnit<R>, emitter: &RunEmitter) -> UnitResult<R> {
    let started = Instant::now();
    let outcome = unit.run();
    let duration_ms = started.elapsed().as_millis() as u64;
    match &outcome {
        Ok(_) => {
            tracing::debug!("Unit {} completed in {}ms", index, duration_ms);
            emitter.unit_completed(index, duration_ms);
        }
        Err(e) => {
            tracing::warn!("Unit {} failed: {}", index, e);
            emitter.unit_failed(index, e.to_string());
        }
    }
    outcome
}

fn run_inline<R>(units: Vec<WorkUnit<R>>, emitter: &RunEmitter) -> Result<Vec<R>, EngineError> {
    let mut results = Vec::with_capacity(units.len());
    for (index, unit) in units.into_iter().enumerate() {
        let value = run_unit(index, unit, emitter)
            .map_err(|source| EngineError::WorkerFailure { index, source })?;
        results.push(value);
    }
    Ok(results)
}

type Job<R> = (usize, WorkUnit<R>);

/// Worker threads pulling indexed units from a shared job channel.
///
/// At most `capacity` units are dispatched beyond the last one handed to
/// the consumer, so results buffered out of order never exceed
/// `capacity` either.
struct WorkerPool<R> {
    queued: std::iter::Enumerate<std::vec::IntoIter<WorkUnit<R>>>,
    jobs: Option<Sender<Job<R>>>,
    results: Option<Receiver<(usize, UnitResult<R>)>>,
    pending: BTreeMap<usize, UnitResult<R>>,
    stop: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
    total: usize,
}

impl<R> WorkerPool<R>
where
    R: Send + 'static,
{
    fn spawn(units: Vec<WorkUnit<R>>, workers: usize, capacity: usize, emitter: RunEmitter) -> Self {
        let total = units.len();
        let capacity = capacity.max(workers).max(1);
        let (job_tx, job_rx): (Sender<Job<R>>, Receiver<Job<R>>) = unbounded();
        let (result_tx, result_rx) = bounded(capacity);

        let stop = Arc::new(AtomicBool::new(false));
        let handles = (0..workers)
            .map(|worker_id| {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let stop = Arc::clone(&stop);
                let emitter = emitter.clone();
                std::thread::spawn(move || {
                    worker_loop(worker_id, job_rx, result_tx, stop, emitter)
                })
            })
            .collect();

        let mut pool = Self {
            queued: units.into_iter().enumerate(),
            jobs: Some(job_tx),
            results: Some(result_rx),
            pending: BTreeMap::new(),
            stop,
            handles,
            total,
        };
        for _ in 0..capacity {
            pool.dispatch_next();
        }
        pool
    }

    /// Hand the next queued unit to the workers. Closing the job channel
    /// once the queue is empty lets idle workers exit.
    fn dispatch_next(&mut self) {
        if self.jobs.is_none() {
            return;
        }
        match self.queued.next() {
            Some(job) => {
                if let Some(jobs) = &self.jobs {
                    // Workers hold the receiver until the channel closes.
                    let _ = jobs.send(job);
                }
            }
            None => self.jobs = None,
        }
    }

    /// Result for `index`, buffering any that arrive ahead of it. Yielding
    /// a result releases one more unit. `None` once the workers have
    /// exited without producing it.
    fn take(&mut self, index: usize) -> Option<UnitResult<R>> {
        let outcome = self.receive(index);
        if outcome.is_some() {
            self.dispatch_next();
        }
        outcome
    }

    fn receive(&mut self, index: usize) -> Option<UnitResult<R>> {
        if let Some(outcome) = self.pending.remove(&index) {
            return Some(outcome);
        }
        let results = self.results.as_ref()?;
        while let Ok((arrived, outcome)) = results.recv() {
            if arrived == index {
                return Some(outcome);
            }
            self.pending.insert(arrived, outcome);
        }
        None
    }

    /// Collect every result in submission order.
    fn drain(mut self) -> Result<Vec<R>, EngineError> {
        let mut slots: Vec<Option<R>> = (0..self.total).map(|_| None).collect();
        let mut failure: Option<(usize, parcore::AlgorithmError)> = None;

        if let Some(results) = self.results.take() {
            while let Ok((index, outcome)) = results.recv() {
                match outcome {
                    Ok(value) => {
                        slots[index] = Some(value);
                        self.dispatch_next();
                    }
                    Err(source) => {
                        self.stop.store(true, Ordering::Release);
                        self.jobs = None;
                        if failure.as_ref().map_or(true, |(first, _)| index < *first) {
                            failure = Some((index, source));
                        }
                    }
                }
            }
        }
        self.join();

        if let Some((index, source)) = failure {
            return Err(EngineError::WorkerFailure { index, source });
        }
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or_else(|| lost_result(index)))
            .collect()
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.jobs = None;
        // Dropping the receiver unblocks workers waiting on a full channel.
        self.results = None;
        self.pending.clear();
        self.join();
    }

    fn join(&mut self) {
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                tracing::error!("Worker thread terminated abnormally");
            }
        }
    }
}

impl<R> Drop for WorkerPool<R> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.jobs = None;
        self.results = None;
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop<R>(
    worker_id: usize,
    jobs: Receiver<Job<R>>,
    results: Sender<(usize, UnitResult<R>)>,
    stop: Arc<AtomicBool>,
    emitter: RunEmitter,
) {
    while let Ok((index, unit)) = jobs.recv() {
        if stop.load(Ordering::Acquire) {
            break;
        }
        let outcome = run_unit(index, unit, &emitter);
        if results.send((index, outcome)).is_err() {
            break; // Receiver dropped
        }
    }
    tracing::trace!("Worker {} exiting", worker_id);
}

fn lost_result(index: usize) -> EngineError {
    EngineError::WorkerFailure {
        index,
        source: parcore::AlgorithmError::Failed(
            "worker pool exited before delivering a result".to_string(),
        ),
    }
}

enum Source<R> {
    Inline(std::vec::IntoIter<WorkUnit<R>>),
    Pool(WorkerPool<R>),
}

/// Single-pass, submission-ordered stream of unit results.
///
/// A failed unit is yielded as [`EngineError::WorkerFailure`] at its
/// position and ends the stream. Dropping the stream early stops dispatch
/// and discards results nobody read.
pub struct ResultStream<R> {
    source: Source<R>,
    label: String,
    emitter: RunEmitter,
    started: Instant,
    next_index: usize,
    total: usize,
    finished: bool,
    failed: bool,
}

impl<R> ResultStream<R>
where
    R: Send + 'static,
{
    /// Number of units not yet yielded
    pub fn remaining(&self) -> usize {
        if self.finished {
            0
        } else {
            self.total - self.next_index
        }
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Source::Pool(pool) = &mut self.source {
            pool.shutdown();
        }
        let duration_ms = self.started.elapsed().as_millis() as u64;
        let success = !self.failed && self.next_index >= self.total;
        self.emitter.run_completed(success, duration_ms);
        if success {
            tracing::info!("Lazy run '{}' drained in {}ms", self.label, duration_ms);
        } else if self.failed {
            tracing::error!("Lazy run '{}' stopped on failure", self.label);
        } else {
            tracing::debug!(
                "Lazy run '{}' abandoned with {} units unread",
                self.label,
                self.total - self.next_index
            );
        }
    }
}

impl<R> ResultStream<Vec<R>>
where
    R: Send + 'static,
{
    /// Flatten per-chunk result vectors into a stream of items.
    pub fn flatten_chunks(self) -> FlattenChunks<R> {
        FlattenChunks {
            stream: self,
            current: Vec::new().into_iter(),
        }
    }
}

impl<R> Iterator for ResultStream<R>
where
    R: Send + 'static,
{
    type Item = Result<R, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.next_index >= self.total {
            self.finish();
            return None;
        }

        let index = self.next_index;
        let outcome = match &mut self.source {
            Source::Inline(units) => units.next().map(|unit| run_unit(index, unit, &self.emitter)),
            Source::Pool(pool) => pool.take(index),
        };

        match outcome {
            Some(Ok(value)) => {
                self.next_index += 1;
                if self.next_index == self.total {
                    self.finish();
                }
                Some(Ok(value))
            }
            Some(Err(source)) => {
                self.failed = true;
                self.finish();
                Some(Err(EngineError::WorkerFailure { index, source }))
            }
            None => {
                self.failed = true;
                self.finish();
                Some(Err(lost_result(index)))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

impl<R> Drop for ResultStream<R> {
    fn drop(&mut self) {
        if !self.finished {
            self.finished = true;
            let duration_ms = self.started.elapsed().as_millis() as u64;
            self.emitter.run_completed(false, duration_ms);
            tracing::debug!(
                "Lazy run '{}' dropped with {} units unread",
                self.label,
                self.total - self.next_index
            );
        }
        // Pool teardown happens in WorkerPool::drop.
    }
}

/// Item-level view over a chunked [`ResultStream`].
///
/// Limitation: a unit builds its whole chunk before the first of its items
/// is yielded, so per-item latency is at chunk granularity and a chunk's
/// output is held in memory at once.
pub struct FlattenChunks<R> {
    stream: ResultStream<Vec<R>>,
    current: std::vec::IntoIter<R>,
}

impl<R> Iterator for FlattenChunks<R>
where
    R: Send + 'static,
{
    type Item = Result<R, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.next() {
                return Some(Ok(item));
            }
            match self.stream.next()? {
                Ok(chunk) => self.current = chunk.into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
