mod base;

pub use base::{EventBus, ExecutionEvent, RunEmitter, RunId};
