pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod insights;
pub mod modeling;
pub mod scoring;
pub mod state;
pub mod types;
pub mod window;

pub use config::EngineConfig;
pub use engine::PerformanceEngine;
pub use error::{EngineError, EngineResult};
pub use state::SessionPerformanceState;
