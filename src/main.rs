use std::path::PathBuf;
use std::process::ExitCode;

use neuro_adaptive_engine::config::Config;
use neuro_adaptive_engine::engine::{EngineConfig, EngineError, PerformanceEngine};
use neuro_adaptive_engine::{logging, runner};

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config);

    let engine = PerformanceEngine::new(EngineConfig::from_env());
    let input = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or(config.input_path);

    let result = match input {
        Some(path) => runner::run_file(&engine, &path),
        None => runner::run_reader(&engine, std::io::stdin().lock()),
    };

    match result.and_then(|response| serde_json::to_string_pretty(&response).map_err(EngineError::from)) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "submission failed");
            ExitCode::FAILURE
        }
    }
}
