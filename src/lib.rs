pub mod config;
pub mod engine;
pub mod logging;
pub mod runner;

pub use engine::{EngineConfig, EngineError, PerformanceEngine, SessionPerformanceState};
