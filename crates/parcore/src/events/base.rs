use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

pub type RunId = Uuid;

/// Events emitted while an engine run executes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExecutionEvent {
    RunStarted {
        run_id: RunId,
        label: String,
        units: usize,
        workers: usize,
        lazy: bool,
        timestamp: DateTime<Utc>,
    },
    UnitCompleted {
        run_id: RunId,
        index: usize,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    UnitFailed {
        run_id: RunId,
        index: usize,
        error: String,
        timestamp: DateTime<Utc>,
    },
    RunCompleted {
        run_id: RunId,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

impl ExecutionEvent {
    pub fn run_id(&self) -> RunId {
        match self {
            ExecutionEvent::RunStarted { run_id, .. }
            | ExecutionEvent::UnitCompleted { run_id, .. }
            | ExecutionEvent::UnitFailed { run_id, .. }
            | ExecutionEvent::RunCompleted { run_id, .. } => *run_id,
        }
    }
}

/// Event emitter bound to a single run, cloned into every worker
#[derive(Clone)]
pub struct RunEmitter {
    run_id: RunId,
    sender: Option<broadcast::Sender<ExecutionEvent>>,
}

impl RunEmitter {
    pub fn new(run_id: RunId, sender: broadcast::Sender<ExecutionEvent>) -> Self {
        Self {
            run_id,
            sender: Some(sender),
        }
    }

    /// Emitter that drops every event, for runs without a bus attached.
    pub fn detached() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            sender: None,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }

    pub fn run_started(&self, label: &str, units: usize, workers: usize, lazy: bool) {
        self.emit(ExecutionEvent::RunStarted {
            run_id: self.run_id,
            label: label.to_string(),
            units,
            workers,
            lazy,
            timestamp: Utc::now(),
        });
    }

    pub fn unit_completed(&self, index: usize, duration_ms: u64) {
        self.emit(ExecutionEvent::UnitCompleted {
            run_id: self.run_id,
            index,
            duration_ms,
            timestamp: Utc::now(),
        });
    }

    pub fn unit_failed(&self, index: usize, error: impl Into<String>) {
        self.emit(ExecutionEvent::UnitFailed {
            run_id: self.run_id,
            index,
            error: error.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn run_completed(&self, success: bool, duration_ms: u64) {
        self.emit(ExecutionEvent::RunCompleted {
            run_id: self.run_id,
            success,
            duration_ms,
            timestamp: Utc::now(),
        });
    }
}

/// Global event bus
pub struct EventBus {
    sender: broadcast::Sender<ExecutionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.sender.subscribe()
    }

    pub fn create_emitter(&self) -> RunEmitter {
        RunEmitter::new(Uuid::new_v4(), self.sender.clone())
    }
}
