use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrainParams {
    pub time_cap_s: f64,
    pub stddev_cap_s: f64,
    pub streak_cap: u32,
    pub time_weight: f64,
    pub variance_weight: f64,
    pub streak_weight: f64,
}

impl Default for StrainParams {
    fn default() -> Self {
        Self {
            time_cap_s: 60.0,
            stddev_cap_s: 30.0,
            streak_cap: 5,
            time_weight: 0.40,
            variance_weight: 0.30,
            streak_weight: 0.30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeThresholds {
    pub fluent_accuracy: f64,
    pub struggling_accuracy: f64,
    pub slow_response_s: f64,
    pub fast_response_s: f64,
}

impl Default for ModeThresholds {
    fn default() -> Self {
        Self {
            fluent_accuracy: 70.0,
            struggling_accuracy: 50.0,
            slow_response_s: 30.0,
            fast_response_s: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaknessParams {
    pub mastery_threshold: f64,
    pub recovery_attempts: u32,
    pub keyword_min_len: usize,
    pub keywords_per_answer: usize,
}

impl Default for WeaknessParams {
    fn default() -> Self {
        Self {
            mastery_threshold: 60.0,
            recovery_attempts: 3,
            keyword_min_len: 4,
            keywords_per_answer: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressParams {
    pub mistake_streak: u32,
    pub spike_ratio: f64,
    pub spike_floor_s: f64,
    pub rolling_window: usize,
    pub rolling_accuracy_floor: f64,
}

impl Default for StressParams {
    fn default() -> Self {
        Self {
            mistake_streak: 3,
            spike_ratio: 2.5,
            spike_floor_s: 30.0,
            rolling_window: 5,
            rolling_accuracy_floor: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryParams {
    pub accuracy_weight: f64,
    pub coverage_weight: f64,
    pub streak_weight: f64,
    pub coverage_target: f64,
    pub streak_cap: u32,
}

impl Default for MasteryParams {
    fn default() -> Self {
        Self {
            accuracy_weight: 0.60,
            coverage_weight: 0.20,
            streak_weight: 0.20,
            coverage_target: 8.0,
            streak_cap: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelParams {
    pub mastery_up: f64,
    pub mastery_down: f64,
    pub accuracy_up: f64,
    pub accuracy_down: f64,
    pub use_mastery: bool,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            mastery_up: 80.0,
            mastery_down: 50.0,
            accuracy_up: 80.0,
            accuracy_down: 40.0,
            use_mastery: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPolicy {
    #[default]
    EverySubmission,
    TransitionsOnly,
}

impl HistoryPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "every_submission" | "every" => Some(Self::EverySubmission),
            "transitions_only" | "transitions" => Some(Self::TransitionsOnly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub strain: StrainParams,
    pub mode: ModeThresholds,
    pub weakness: WeaknessParams,
    pub stress: StressParams,
    pub mastery: MasteryParams,
    pub level: LevelParams,
    pub level_history: HistoryPolicy,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("NEURO_LEVEL_HISTORY") {
            match HistoryPolicy::parse(&val) {
                Some(policy) => config.level_history = policy,
                None => tracing::warn!(value = %val, "ignoring unknown NEURO_LEVEL_HISTORY"),
            }
        }
        if let Ok(val) = std::env::var("NEURO_LEVEL_USE_MASTERY") {
            match parse_flag(&val) {
                Some(flag) => config.level.use_mastery = flag,
                None => tracing::warn!(value = %val, "ignoring unknown NEURO_LEVEL_USE_MASTERY"),
            }
        }

        config
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let config = EngineConfig::default();
        let strain = &config.strain;
        let mastery = &config.mastery;
        assert!((strain.time_weight + strain.variance_weight + strain.streak_weight - 1.0).abs() < 1e-9);
        assert!((mastery.accuracy_weight + mastery.coverage_weight + mastery.streak_weight - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_history_policy_parse() {
        assert_eq!(HistoryPolicy::parse("transitions_only"), Some(HistoryPolicy::TransitionsOnly));
        assert_eq!(HistoryPolicy::parse("EVERY_SUBMISSION"), Some(HistoryPolicy::EverySubmission));
        assert_eq!(HistoryPolicy::parse("sometimes"), None);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(" FALSE "), Some(false));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_use_mastery_env_keeps_value_when_unparseable() {
        std::env::set_var("NEURO_LEVEL_USE_MASTERY", "false");
        assert!(!EngineConfig::from_env().level.use_mastery);
        std::env::set_var("NEURO_LEVEL_USE_MASTERY", "sometimes");
        assert!(EngineConfig::from_env().level.use_mastery);
        std::env::remove_var("NEURO_LEVEL_USE_MASTERY");
    }

    #[test]
    fn test_profiling_minimum_is_not_configurable() {
        let json = serde_json::to_value(WeaknessParams::default()).unwrap();
        assert!(json.get("min_attempts").is_none());
        assert_eq!(json["recovery_attempts"], 3);
    }

    #[test]
    fn test_config_json_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"level_history":"transitions_only"}"#).unwrap();
        assert_eq!(config.level_history, HistoryPolicy::TransitionsOnly);
        assert_eq!(config.stress.mistake_streak, 3);
    }
}
