use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::insights::ProgressReport;
use crate::engine::types::{ExerciseSubmission, Level, SubmissionOutcome};
use crate::engine::{EngineResult, PerformanceEngine, SessionPerformanceState};

const DEFAULT_SUBJECT: &str = "general";

/// One unit of work for the command-line driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineRequest {
    /// Prior state; a fresh session when absent.
    #[serde(default)]
    pub state: Option<SessionPerformanceState>,
    #[serde(default)]
    pub submission: ExerciseSubmission,
    /// Placement from the diagnostic step, applied before the submission.
    #[serde(default)]
    pub diagnosed_level: Option<Level>,
    #[serde(default)]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResponse {
    pub state: SessionPerformanceState,
    pub outcome: SubmissionOutcome,
    pub report: ProgressReport,
}

pub fn run_request(engine: &PerformanceEngine, request: EngineRequest) -> EngineResult<EngineResponse> {
    let mut state = request.state.unwrap_or_default();
    if let Some(level) = request.diagnosed_level {
        state.apply_diagnosis(level)?;
    }

    let (state, outcome) = engine.submit(state, &request.submission)?;
    let subject = request.subject.as_deref().unwrap_or(DEFAULT_SUBJECT);
    let report = ProgressReport::from_state(&state, subject);

    Ok(EngineResponse {
        state,
        outcome,
        report,
    })
}

pub fn run_json(engine: &PerformanceEngine, json: &str) -> EngineResult<EngineResponse> {
    let request: EngineRequest = serde_json::from_str(json)?;
    run_request(engine, request)
}

pub fn run_reader<R: Read>(engine: &PerformanceEngine, mut reader: R) -> EngineResult<EngineResponse> {
    let mut json = String::new();
    reader.read_to_string(&mut json)?;
    run_json(engine, &json)
}

pub fn run_file(engine: &PerformanceEngine, path: &Path) -> EngineResult<EngineResponse> {
    tracing::debug!(path = %path.display(), "reading submission");
    let json = std::fs::read_to_string(path)?;
    run_json(engine, &json)
}
