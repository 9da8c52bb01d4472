use thiserror::Error;

use crate::engine::types::Level;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid session state: {0}")]
    InvariantViolation(String),
    #[error("bounded window holds {len} items, capacity is {capacity}")]
    WindowOverflow { capacity: usize, len: usize },
    #[error("bounded set contains duplicate entry {0:?}")]
    DuplicateEntry(String),
    #[error("session already diagnosed at level {current}")]
    AlreadyDiagnosed { current: Level },
    #[error("diagnosis must resolve to Beginner, Intermediate or Advanced")]
    InvalidDiagnosis,
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
