use crate::engine::config::ModeThresholds;
use crate::engine::types::AdaptiveMode;

type ModeRule = fn(&ModeThresholds, f64, f64) -> bool;

fn fluent_but_slow(t: &ModeThresholds, accuracy: f64, avg_rt: f64) -> bool {
    accuracy >= t.fluent_accuracy && avg_rt > t.slow_response_s
}

fn fast_and_wrong(t: &ModeThresholds, accuracy: f64, avg_rt: f64) -> bool {
    accuracy < t.struggling_accuracy && avg_rt < t.fast_response_s
}

fn slow_and_wrong(t: &ModeThresholds, accuracy: f64, avg_rt: f64) -> bool {
    accuracy < t.struggling_accuracy && avg_rt > t.slow_response_s
}

/// Evaluated top-down; the first matching rule decides the mode.
const RULES: [(AdaptiveMode, ModeRule); 3] = [
    (AdaptiveMode::FluencyTraining, fluent_but_slow),
    (AdaptiveMode::ConceptReinforcement, fast_and_wrong),
    (AdaptiveMode::CognitiveOverload, slow_and_wrong),
];

pub struct AdaptiveModeClassifier {
    thresholds: ModeThresholds,
}

impl Default for AdaptiveModeClassifier {
    fn default() -> Self {
        Self::new(ModeThresholds::default())
    }
}

impl AdaptiveModeClassifier {
    pub fn new(thresholds: ModeThresholds) -> Self {
        Self { thresholds }
    }

    pub fn classify(&self, accuracy_pct: f64, avg_response_time_s: f64) -> AdaptiveMode {
        RULES
            .iter()
            .find(|(_, rule)| rule(&self.thresholds, accuracy_pct, avg_response_time_s))
            .map(|(mode, _)| *mode)
            .unwrap_or(AdaptiveMode::Standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(accuracy: f64, avg_rt: f64) -> AdaptiveMode {
        AdaptiveModeClassifier::default().classify(accuracy, avg_rt)
    }

    #[test]
    fn test_overload_scenario() {
        assert_eq!(classify(40.0, 35.0), AdaptiveMode::CognitiveOverload);
    }

    #[test]
    fn test_fluency_boundaries() {
        assert_eq!(classify(70.0, 30.1), AdaptiveMode::FluencyTraining);
        assert_eq!(classify(70.0, 30.0), AdaptiveMode::Standard);
        assert_eq!(classify(69.9, 45.0), AdaptiveMode::Standard);
    }

    #[test]
    fn test_reinforcement_boundaries() {
        assert_eq!(classify(49.9, 7.9), AdaptiveMode::ConceptReinforcement);
        assert_eq!(classify(50.0, 5.0), AdaptiveMode::Standard);
        assert_eq!(classify(20.0, 8.0), AdaptiveMode::Standard);
    }

    #[test]
    fn test_overload_boundaries() {
        assert_eq!(classify(49.9, 30.1), AdaptiveMode::CognitiveOverload);
        assert_eq!(classify(49.9, 30.0), AdaptiveMode::Standard);
        assert_eq!(classify(50.0, 60.0), AdaptiveMode::Standard);
    }

    #[test]
    fn test_empty_session_is_reinforcement() {
        // zero accuracy with zero response time lands on the fast-and-wrong rule
        assert_eq!(classify(0.0, 0.0), AdaptiveMode::ConceptReinforcement);
    }
}
