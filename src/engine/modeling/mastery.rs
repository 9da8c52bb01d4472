use std::collections::BTreeMap;

use crate::engine::config::MasteryParams;
use crate::engine::types::{AccuracyCounter, QuestionType};

pub struct MasteryEstimator {
    params: MasteryParams,
}

impl Default for MasteryEstimator {
    fn default() -> Self {
        Self::new(MasteryParams::default())
    }
}

impl MasteryEstimator {
    pub fn new(params: MasteryParams) -> Self {
        Self { params }
    }

    /// Composite mastery in [0, 100]: overall accuracy, breadth of topics and
    /// question types attempted, and the best correct streak.
    pub fn compute(
        &self,
        topic_accuracy: &BTreeMap<String, AccuracyCounter>,
        type_accuracy: &BTreeMap<QuestionType, AccuracyCounter>,
        best_streak: u32,
    ) -> f64 {
        let p = &self.params;

        let total_correct: u64 = topic_accuracy.values().map(|c| c.correct as u64).sum();
        let total_attempts: u64 = topic_accuracy.values().map(|c| c.total as u64).sum();
        let accuracy_component = if total_attempts == 0 {
            0.0
        } else {
            total_correct as f64 / total_attempts as f64 * 100.0
        };

        let breadth = (topic_accuracy.len() + type_accuracy.len()) as f64;
        let coverage_component = if p.coverage_target > 0.0 {
            (breadth / p.coverage_target).min(1.0) * 100.0
        } else {
            100.0
        };

        let streak_component = if p.streak_cap == 0 {
            0.0
        } else {
            best_streak.min(p.streak_cap) as f64 / p.streak_cap as f64 * 100.0
        };

        let mastery = p.accuracy_weight * accuracy_component
            + p.coverage_weight * coverage_component
            + p.streak_weight * streak_component;
        mastery.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(correct: u32, total: u32) -> AccuracyCounter {
        AccuracyCounter { correct, total }
    }

    #[test]
    fn test_empty_history_scores_zero() {
        let mastery = MasteryEstimator::default().compute(&BTreeMap::new(), &BTreeMap::new(), 0);
        assert_eq!(mastery, 0.0);
    }

    #[test]
    fn test_weighted_components() {
        let topics = BTreeMap::from([
            ("algebra".to_string(), counter(3, 4)),
            ("geometry".to_string(), counter(1, 4)),
        ]);
        let types = BTreeMap::from([(QuestionType::Mcq, counter(4, 8))]);
        let mastery = MasteryEstimator::default().compute(&topics, &types, 4);
        // accuracy 50, coverage 3/8, streak 4/10
        let expected = 0.6 * 50.0 + 0.2 * 37.5 + 0.2 * 40.0;
        assert!((mastery - expected).abs() < 1e-9);
    }

    #[test]
    fn test_saturates_at_hundred() {
        let topics: BTreeMap<String, AccuracyCounter> =
            (0..6).map(|i| (format!("t{i}"), counter(5, 5))).collect();
        let types: BTreeMap<QuestionType, AccuracyCounter> =
            QuestionType::ALL.iter().map(|q| (*q, counter(1, 1))).collect();
        let mastery = MasteryEstimator::default().compute(&topics, &types, 25);
        assert!((mastery - 100.0).abs() < 1e-9);
    }
}
