use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::modeling::weakness::PROFILE_MIN_ATTEMPTS;
use crate::engine::types::{
    AccuracyCounter, AdaptiveMode, Level, QuestionType, StressAction, WeaknessRecord,
    RESPONSE_TIME_CAPACITY, ROLLING_RESULT_CAPACITY,
};
use crate::engine::window::BoundedWindow;

pub type ResponseTimes = BoundedWindow<f64, RESPONSE_TIME_CAPACITY>;
pub type RollingResults = BoundedWindow<bool, ROLLING_RESULT_CAPACITY>;

/// Everything the engine knows about one learning session. Passed by value
/// into [`crate::engine::PerformanceEngine::submit`] and handed back updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionPerformanceState {
    pub topic_accuracy: BTreeMap<String, AccuracyCounter>,
    pub type_accuracy: BTreeMap<QuestionType, AccuracyCounter>,
    pub response_times: ResponseTimes,
    pub rolling_results: RollingResults,
    pub correct_streak: u32,
    pub mistake_streak: u32,
    pub best_streak: u32,
    pub cognitive_strain_index: f64,
    pub adaptive_mode: Option<AdaptiveMode>,
    pub weakness_profile: BTreeMap<String, WeaknessRecord>,
    pub stress_history: Vec<StressAction>,
    pub level: Level,
    pub level_history: Vec<Level>,
    pub total_correct: u32,
    pub total_attempts: u32,
    pub total_time_seconds: f64,
    pub mastery_score: f64,
}

impl SessionPerformanceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh session that has already been placed at `level`.
    pub fn diagnosed(level: Level) -> EngineResult<Self> {
        let mut state = Self::new();
        state.apply_diagnosis(level)?;
        Ok(state)
    }

    /// The one-time `unknown -> tier` transition. The tier becomes the first
    /// `level_history` entry.
    pub fn apply_diagnosis(&mut self, level: Level) -> EngineResult<()> {
        if self.level.is_diagnosed() {
            return Err(EngineError::AlreadyDiagnosed {
                current: self.level,
            });
        }
        if !level.is_diagnosed() {
            return Err(EngineError::InvalidDiagnosis);
        }
        self.level = level;
        self.level_history.push(level);
        tracing::info!(level = %level, "session diagnosed");
        Ok(())
    }

    /// Positive for a run of correct answers, negative for a run of mistakes.
    pub fn streak(&self) -> i64 {
        if self.mistake_streak > 0 {
            -(self.mistake_streak as i64)
        } else {
            self.correct_streak as i64
        }
    }

    /// Lifetime accuracy in percent; 0 before the first attempt.
    pub fn accuracy_pct(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            self.total_correct as f64 / self.total_attempts as f64 * 100.0
        }
    }

    pub fn avg_response_time(&self) -> f64 {
        self.response_times.mean().unwrap_or(0.0)
    }

    pub fn record_answer(&mut self, was_correct: bool) {
        self.total_attempts += 1;
        self.rolling_results.push(was_correct);
        if was_correct {
            self.total_correct += 1;
            self.correct_streak += 1;
            self.mistake_streak = 0;
            self.best_streak = self.best_streak.max(self.correct_streak);
        } else {
            self.mistake_streak += 1;
            self.correct_streak = 0;
        }
    }

    pub fn record_response_time(&mut self, seconds: f64) {
        self.response_times.push(seconds);
        self.total_time_seconds += seconds;
    }

    /// Rejects records that no sequence of submissions could have produced.
    pub fn validate(&self) -> EngineResult<()> {
        fn violation(msg: String) -> EngineResult<()> {
            Err(EngineError::InvariantViolation(msg))
        }

        if self.total_correct > self.total_attempts {
            return violation(format!(
                "total_correct {} exceeds total_attempts {}",
                self.total_correct, self.total_attempts
            ));
        }

        for (topic, counter) in &self.topic_accuracy {
            if counter.correct > counter.total {
                return violation(format!(
                    "topic {topic:?}: correct {} exceeds total {}",
                    counter.correct, counter.total
                ));
            }
        }
        for (qtype, counter) in &self.type_accuracy {
            if counter.correct > counter.total {
                return violation(format!(
                    "question type {qtype}: correct {} exceeds total {}",
                    counter.correct, counter.total
                ));
            }
        }

        let topic_total: u64 = self.topic_accuracy.values().map(|c| c.total as u64).sum();
        let topic_correct: u64 = self.topic_accuracy.values().map(|c| c.correct as u64).sum();
        if topic_total != self.total_attempts as u64 || topic_correct != self.total_correct as u64 {
            return violation(format!(
                "topic counters ({topic_correct}/{topic_total}) disagree with lifetime totals ({}/{})",
                self.total_correct, self.total_attempts
            ));
        }

        if self.correct_streak > 0 && self.mistake_streak > 0 {
            return violation(format!(
                "correct_streak {} and mistake_streak {} are both nonzero",
                self.correct_streak, self.mistake_streak
            ));
        }
        if self.best_streak < self.correct_streak {
            return violation(format!(
                "best_streak {} is below correct_streak {}",
                self.best_streak, self.correct_streak
            ));
        }

        if let Some(bad) = self
            .response_times
            .iter()
            .find(|t| !t.is_finite() || **t < 0.0)
        {
            return violation(format!("response time {bad} is not a non-negative number"));
        }
        if !self.total_time_seconds.is_finite() || self.total_time_seconds < 0.0 {
            return violation(format!(
                "total_time_seconds {} is not a non-negative number",
                self.total_time_seconds
            ));
        }

        if !(0.0..=100.0).contains(&self.cognitive_strain_index) {
            return violation(format!(
                "cognitive_strain_index {} outside [0, 100]",
                self.cognitive_strain_index
            ));
        }
        if !(0.0..=100.0).contains(&self.mastery_score) {
            return violation(format!("mastery_score {} outside [0, 100]", self.mastery_score));
        }

        for (topic, record) in &self.weakness_profile {
            let total = self.topic_accuracy.get(topic).map(|c| c.total).unwrap_or(0);
            if total < PROFILE_MIN_ATTEMPTS {
                return violation(format!(
                    "weakness profile lists {topic:?} with only {total} attempts"
                ));
            }
            if !(0.0..=100.0).contains(&record.mastery_score) {
                return violation(format!(
                    "weakness profile {topic:?}: mastery {} outside [0, 100]",
                    record.mastery_score
                ));
            }
        }

        self.validate_levels()
    }

    fn validate_levels(&self) -> EngineResult<()> {
        if self.level_history.contains(&Level::Unknown) {
            return Err(EngineError::InvariantViolation(
                "level_history records unknown after diagnosis".to_string(),
            ));
        }
        match self.level_history.last() {
            None if self.level.is_diagnosed() => {
                return Err(EngineError::InvariantViolation(format!(
                    "level {} has no history entry",
                    self.level
                )));
            }
            Some(_) if !self.level.is_diagnosed() => {
                return Err(EngineError::InvariantViolation(
                    "level is unknown but level_history is not empty".to_string(),
                ));
            }
            Some(last) if *last != self.level => {
                return Err(EngineError::InvariantViolation(format!(
                    "level {} does not match last history entry {last}",
                    self.level
                )));
            }
            _ => {}
        }
        for pair in self.level_history.windows(2) {
            let (from, to) = (tier_rank(pair[0]), tier_rank(pair[1]));
            if from.abs_diff(to) > 1 {
                return Err(EngineError::InvariantViolation(format!(
                    "level_history skips a tier: {} -> {}",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(())
    }
}

fn tier_rank(level: Level) -> u8 {
    match level {
        Level::Unknown => 0,
        Level::Beginner => 1,
        Level::Intermediate => 2,
        Level::Advanced => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_valid() {
        let state = SessionPerformanceState::new();
        assert!(state.validate().is_ok());
        assert_eq!(state.level, Level::Unknown);
        assert!(state.level_history.is_empty());
        assert_eq!(state.streak(), 0);
    }

    #[test]
    fn test_streaks_are_mutually_exclusive() {
        let mut state = SessionPerformanceState::new();
        state.record_answer(true);
        state.record_answer(true);
        assert_eq!((state.correct_streak, state.mistake_streak), (2, 0));
        assert_eq!(state.streak(), 2);
        state.record_answer(false);
        assert_eq!((state.correct_streak, state.mistake_streak), (0, 1));
        assert_eq!(state.streak(), -1);
        assert_eq!(state.best_streak, 2);
        state.record_answer(true);
        assert_eq!((state.correct_streak, state.mistake_streak), (1, 0));
        assert_eq!(state.best_streak, 2);
    }

    #[test]
    fn test_diagnosis_happens_once() {
        let mut state = SessionPerformanceState::new();
        assert!(matches!(
            state.apply_diagnosis(Level::Unknown),
            Err(EngineError::InvalidDiagnosis)
        ));
        state.apply_diagnosis(Level::Intermediate).unwrap();
        assert_eq!(state.level_history, vec![Level::Intermediate]);
        assert!(matches!(
            state.apply_diagnosis(Level::Advanced),
            Err(EngineError::AlreadyDiagnosed { current: Level::Intermediate })
        ));
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inflated_correct_count() {
        let mut state = SessionPerformanceState::new();
        state.total_correct = 3;
        state.total_attempts = 2;
        let err = state.validate().unwrap_err();
        assert!(err.to_string().contains("total_correct 3 exceeds total_attempts 2"));
    }

    #[test]
    fn test_validate_rejects_conflicting_streaks() {
        let mut state = SessionPerformanceState::new();
        state.correct_streak = 1;
        state.best_streak = 1;
        state.mistake_streak = 1;
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_weakness_without_attempts() {
        let mut state = SessionPerformanceState::new();
        state
            .weakness_profile
            .insert("algebra".to_string(), WeaknessRecord::new(chrono::Utc::now()));
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_skipped_tier() {
        let mut state = SessionPerformanceState::diagnosed(Level::Beginner).unwrap();
        state.level = Level::Advanced;
        state.level_history.push(Level::Advanced);
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_partial_json_loads_with_defaults() {
        let state: SessionPerformanceState =
            serde_json::from_str(r#"{"level":"Beginner","level_history":["Beginner"]}"#).unwrap();
        assert_eq!(state.level, Level::Beginner);
        assert!(state.response_times.is_empty());
        assert!(state.validate().is_ok());
    }
}
