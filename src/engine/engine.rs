use chrono::{DateTime, Utc};

use crate::engine::config::EngineConfig;
use crate::engine::decision::LevelAdjuster;
use crate::engine::error::EngineResult;
use crate::engine::modeling::{
    AdaptiveModeClassifier, CognitiveStrainEstimator, MasteryEstimator, StressDetector,
    WeaknessChange, WeaknessObservation, WeaknessProfiler,
};
use crate::engine::scoring;
use crate::engine::state::SessionPerformanceState;
use crate::engine::types::{AnswerSubmission, ExerciseSubmission, QuestionType, SubmissionOutcome};

/// Topic used for answers that arrive without one.
pub const DEFAULT_TOPIC: &str = "general";

/// Runs one exercise submission through scoring and every derived metric.
/// Holds configuration only; all session data travels in the state value.
pub struct PerformanceEngine {
    config: EngineConfig,
    strain: CognitiveStrainEstimator,
    classifier: AdaptiveModeClassifier,
    profiler: WeaknessProfiler,
    stress: StressDetector,
    mastery: MasteryEstimator,
    level: LevelAdjuster,
}

impl Default for PerformanceEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl PerformanceEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            strain: CognitiveStrainEstimator::new(config.strain.clone()),
            classifier: AdaptiveModeClassifier::new(config.mode.clone()),
            profiler: WeaknessProfiler::new(config.weakness.clone()),
            stress: StressDetector::new(config.stress.clone()),
            mastery: MasteryEstimator::new(config.mastery.clone()),
            level: LevelAdjuster::new(config.level.clone()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn submit(
        &self,
        state: SessionPerformanceState,
        submission: &ExerciseSubmission,
    ) -> EngineResult<(SessionPerformanceState, SubmissionOutcome)> {
        self.submit_at(state, submission, Utc::now())
    }

    /// Same as [`Self::submit`] with an explicit clock for weakness timestamps.
    ///
    /// The incoming state is validated first and rejected when inconsistent.
    /// An empty submission returns the state untouched.
    pub fn submit_at(
        &self,
        mut state: SessionPerformanceState,
        submission: &ExerciseSubmission,
        now: DateTime<Utc>,
    ) -> EngineResult<(SessionPerformanceState, SubmissionOutcome)> {
        state.validate()?;

        if submission.is_empty() {
            tracing::debug!("empty submission, state unchanged");
            let outcome = idle_outcome(&state);
            return Ok((state, outcome));
        }

        let fallback_time = fallback_response_time(submission);
        let mut batch_correct = 0u32;
        let batch_total = submission.answers.len() as u32;

        for answer in &submission.answers {
            let question_type = parse_question_type(answer);
            let was_correct = scoring::score(
                question_type,
                answer.expected_answer.as_deref(),
                answer.submitted_answer.as_deref(),
            );
            if was_correct {
                batch_correct += 1;
            }

            state.record_answer(was_correct);
            state.record_response_time(effective_response_time(answer, fallback_time));
            if let Some(qtype) = question_type {
                state.type_accuracy.entry(qtype).or_default().record(was_correct);
            }

            let topic = answer.topic.trim();
            let topic = if topic.is_empty() { DEFAULT_TOPIC } else { topic };
            let observation = WeaknessObservation {
                topic,
                question_type,
                was_correct,
                incorrect_answer_text: answer.submitted_answer.as_deref(),
                now,
            };
            let change = self.profiler.update(
                &mut state.topic_accuracy,
                &mut state.weakness_profile,
                &observation,
            );
            if change == WeaknessChange::Recovered {
                tracing::debug!(topic, "topic recovered from weakness profile");
            }
        }

        state.cognitive_strain_index = self
            .strain
            .compute(&state.response_times, state.mistake_streak);

        let avg_response_time = state.avg_response_time();
        let mode = self.classifier.classify(state.accuracy_pct(), avg_response_time);
        state.adaptive_mode = Some(mode);

        let signal = self.stress.detect(
            &state.rolling_results,
            &state.response_times,
            state.mistake_streak,
        );
        if let Some(action) = signal.action {
            tracing::info!(
                action = action.as_str(),
                mistake_streak = state.mistake_streak,
                "stress intervention recommended"
            );
            state.stress_history.push(action);
        }

        let mastery = self
            .mastery
            .compute(&state.topic_accuracy, &state.type_accuracy, state.best_streak);
        state.mastery_score = mastery;

        let batch_accuracy = batch_correct as f64 / batch_total as f64 * 100.0;
        let gate = self.config.level.use_mastery.then_some(mastery);
        let change = self.level.apply(
            &mut state.level,
            &mut state.level_history,
            gate,
            batch_accuracy,
            self.config.level_history,
        );
        if change.changed() {
            tracing::info!(from = %change.from, to = %change.to, mastery, "level changed");
        }

        tracing::debug!(
            answers = batch_total,
            correct = batch_correct,
            csi = state.cognitive_strain_index,
            mode = mode.as_str(),
            "submission processed"
        );

        let outcome = SubmissionOutcome {
            accuracy: batch_accuracy,
            correct: batch_correct,
            total: batch_total,
            new_level: state.level,
            level_changed: change.changed(),
            mastery,
            adaptive_mode: state.adaptive_mode,
            cognitive_strain_index: state.cognitive_strain_index,
            avg_response_time,
            stress_detected: signal.triggered,
            recommended_action: signal.action,
        };
        Ok((state, outcome))
    }
}

fn idle_outcome(state: &SessionPerformanceState) -> SubmissionOutcome {
    SubmissionOutcome {
        accuracy: 0.0,
        correct: 0,
        total: 0,
        new_level: state.level,
        level_changed: false,
        mastery: state.mastery_score,
        adaptive_mode: state.adaptive_mode,
        cognitive_strain_index: state.cognitive_strain_index,
        avg_response_time: state.avg_response_time(),
        stress_detected: false,
        recommended_action: None,
    }
}

fn parse_question_type(answer: &AnswerSubmission) -> Option<QuestionType> {
    let parsed = QuestionType::parse(&answer.question_type);
    if parsed.is_none() {
        tracing::warn!(
            question_id = %answer.question_id,
            question_type = %answer.question_type,
            "unknown question type, answer scored as incorrect"
        );
    }
    parsed
}

/// Even share of the exercise total, used for answers without their own time.
fn fallback_response_time(submission: &ExerciseSubmission) -> Option<f64> {
    submission
        .total_time_seconds
        .filter(|t| t.is_finite() && *t >= 0.0)
        .map(|t| t / submission.answers.len() as f64)
}

fn effective_response_time(answer: &AnswerSubmission, fallback: Option<f64>) -> f64 {
    match answer.response_time_seconds {
        Some(t) if t.is_finite() && t >= 0.0 => t,
        Some(t) => {
            tracing::warn!(question_id = %answer.question_id, value = t, "invalid response time, using 0");
            0.0
        }
        None => fallback.unwrap_or_else(|| {
            tracing::warn!(question_id = %answer.question_id, "missing response time, using 0");
            0.0
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{AdaptiveMode, Level, StressAction};

    fn answer(topic: &str, correct: bool, seconds: f64) -> AnswerSubmission {
        AnswerSubmission::new(
            topic,
            QuestionType::Mcq,
            "a",
            if correct { "a" } else { "b" },
            seconds,
        )
    }

    #[test]
    fn test_batch_updates_counters_and_streaks() {
        let engine = PerformanceEngine::default();
        let submission = ExerciseSubmission::new(vec![
            answer("x", true, 10.0),
            answer("x", true, 12.0),
            answer("y", false, 11.0),
        ]);
        let (state, outcome) = engine
            .submit(SessionPerformanceState::new(), &submission)
            .unwrap();

        assert_eq!(state.total_attempts, 3);
        assert_eq!(state.total_correct, 2);
        assert_eq!(state.type_accuracy[&QuestionType::Mcq].total, 3);
        assert_eq!(state.topic_accuracy["x"].correct, 2);
        assert_eq!(state.topic_accuracy["y"].total, 1);
        assert_eq!((state.correct_streak, state.mistake_streak), (0, 1));
        assert_eq!(state.best_streak, 2);
        assert_eq!(state.rolling_results.to_vec(), vec![true, true, false]);
        assert!((state.total_time_seconds - 33.0).abs() < 1e-9);
        assert_eq!(outcome.correct, 2);
        assert_eq!(outcome.total, 3);
        assert!((outcome.accuracy - 200.0 / 3.0).abs() < 1e-9);
        assert!((outcome.avg_response_time - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_csi_matches_reference_scenario() {
        let engine = PerformanceEngine::default();
        let submission = ExerciseSubmission::new(vec![
            answer("x", true, 10.0),
            answer("x", true, 12.0),
            answer("x", true, 11.0),
        ]);
        let (state, _) = engine
            .submit(SessionPerformanceState::new(), &submission)
            .unwrap();
        assert!((state.cognitive_strain_index - 8.15).abs() < 0.01);
        assert_eq!(state.adaptive_mode, Some(AdaptiveMode::Standard));
    }

    #[test]
    fn test_missing_times_use_exercise_total() {
        let engine = PerformanceEngine::default();
        let mut a = answer("x", true, 0.0);
        a.response_time_seconds = None;
        let mut b = answer("x", true, 0.0);
        b.response_time_seconds = Some(f64::NAN);
        let submission = ExerciseSubmission::new(vec![a, b]).with_total_time(30.0);
        let (state, _) = engine
            .submit(SessionPerformanceState::new(), &submission)
            .unwrap();
        assert_eq!(state.response_times.to_vec(), vec![15.0, 0.0]);
    }

    #[test]
    fn test_unknown_question_type_scores_false_but_counts() {
        let engine = PerformanceEngine::default();
        let mut bad = answer("x", true, 5.0);
        bad.question_type = "essay".to_string();
        let (state, outcome) = engine
            .submit(SessionPerformanceState::new(), &ExerciseSubmission::new(vec![bad]))
            .unwrap();
        assert_eq!(outcome.correct, 0);
        assert_eq!(state.total_attempts, 1);
        assert!(state.type_accuracy.is_empty());
        assert_eq!(state.topic_accuracy["x"].total, 1);
    }

    #[test]
    fn test_blank_topic_falls_back_to_default() {
        let engine = PerformanceEngine::default();
        let (state, _) = engine
            .submit(
                SessionPerformanceState::new(),
                &ExerciseSubmission::new(vec![answer("  ", true, 5.0)]),
            )
            .unwrap();
        assert_eq!(state.topic_accuracy[DEFAULT_TOPIC].total, 1);
    }

    #[test]
    fn test_stress_and_level_pipeline() {
        let engine = PerformanceEngine::default();
        let state = SessionPerformanceState::diagnosed(Level::Intermediate).unwrap();
        let submission = ExerciseSubmission::new(vec![
            answer("x", false, 5.0),
            answer("x", false, 5.0),
            answer("x", false, 5.0),
        ]);
        let (state, outcome) = engine.submit(state, &submission).unwrap();
        assert_eq!(outcome.recommended_action, Some(StressAction::SwitchToReview));
        assert!(outcome.stress_detected);
        assert_eq!(state.stress_history, vec![StressAction::SwitchToReview]);
        // mastery = 0.2 * (2/8 * 100) = 5
        assert!((outcome.mastery - 5.0).abs() < 1e-9);
        assert_eq!(state.level, Level::Beginner);
        assert!(outcome.level_changed);
        assert_eq!(state.level_history, vec![Level::Intermediate, Level::Beginner]);
    }
}
