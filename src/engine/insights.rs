use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::state::SessionPerformanceState;
use crate::engine::types::{AccuracyCounter, AdaptiveMode, Level, QuestionType, WeaknessRecord};

const WEAKNESS_MIN_ATTEMPTS: u32 = 2;
const WEAKNESS_ACCURACY_PCT: f64 = 50.0;
const MAX_WEAKNESS_RECOMMENDATIONS: usize = 3;
const STREAK_MENTION_MIN: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaknessKind {
    Topic,
    QuestionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weakness {
    pub kind: WeaknessKind,
    pub name: String,
    pub accuracy: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn weak_accuracy(counter: &AccuracyCounter) -> Option<f64> {
    if counter.total < WEAKNESS_MIN_ATTEMPTS {
        return None;
    }
    counter
        .accuracy_pct()
        .filter(|acc| *acc < WEAKNESS_ACCURACY_PCT)
        .map(round1)
}

/// Topics, then question types, answered at least twice with accuracy under 50%.
pub fn detect_weaknesses(state: &SessionPerformanceState) -> Vec<Weakness> {
    let topics = state.topic_accuracy.iter().filter_map(|(topic, counter)| {
        weak_accuracy(counter).map(|accuracy| Weakness {
            kind: WeaknessKind::Topic,
            name: topic.clone(),
            accuracy,
        })
    });
    let types = state.type_accuracy.iter().filter_map(|(qtype, counter)| {
        weak_accuracy(counter).map(|accuracy| Weakness {
            kind: WeaknessKind::QuestionType,
            name: qtype.as_str().to_string(),
            accuracy,
        })
    });
    topics.chain(types).collect()
}

/// First topic never attempted, else the attempted topic with the lowest accuracy.
pub fn suggest_next_topic<S: AsRef<str>>(
    state: &SessionPerformanceState,
    all_topics: &[S],
) -> Option<String> {
    if let Some(fresh) = all_topics
        .iter()
        .find(|t| !state.topic_accuracy.contains_key(t.as_ref()))
    {
        return Some(fresh.as_ref().to_string());
    }

    let mut weakest: Option<(&str, f64)> = None;
    for topic in all_topics {
        let accuracy = state
            .topic_accuracy
            .get(topic.as_ref())
            .and_then(|c| c.accuracy_pct())
            .unwrap_or(0.0);
        if weakest.map_or(true, |(_, best)| accuracy < best) {
            weakest = Some((topic.as_ref(), accuracy));
        }
    }
    weakest.map(|(topic, _)| topic.to_string())
}

pub fn study_recommendations(state: &SessionPerformanceState, subject: &str) -> Vec<String> {
    let mut recs = Vec::new();
    let mastery = state.mastery_score;

    if mastery < 30.0 {
        recs.push(format!("Focus on building fundamentals in {subject}."));
    } else if mastery < 60.0 {
        recs.push("Solid progress. Continue practicing to strengthen weak areas.".to_string());
    } else {
        recs.push("Strong performance. Consider moving to advanced topics.".to_string());
    }

    for weakness in detect_weaknesses(state)
        .into_iter()
        .take(MAX_WEAKNESS_RECOMMENDATIONS)
    {
        match weakness.kind {
            WeaknessKind::Topic => recs.push(format!(
                "Review {} -- accuracy is {}%.",
                weakness.name, weakness.accuracy
            )),
            WeaknessKind::QuestionType => recs.push(format!(
                "Practice more {} questions.",
                weakness.name.replace('_', " ")
            )),
        }
    }

    if state.correct_streak >= STREAK_MENTION_MIN {
        recs.push(format!(
            "Current streak: {} correct answers in a row.",
            state.correct_streak
        ));
    }

    recs
}

/// Read model of a session for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub subject: String,
    pub level: Level,
    pub level_history: Vec<Level>,
    pub total_correct: u32,
    pub total_attempts: u32,
    pub accuracy: f64,
    pub mastery: f64,
    pub cognitive_strain_index: f64,
    pub avg_response_time: f64,
    pub adaptive_mode: Option<AdaptiveMode>,
    pub weaknesses: Vec<Weakness>,
    pub recommendations: Vec<String>,
    pub topic_accuracy: BTreeMap<String, AccuracyCounter>,
    pub type_accuracy: BTreeMap<QuestionType, AccuracyCounter>,
    pub weakness_profile: BTreeMap<String, WeaknessRecord>,
}

impl ProgressReport {
    pub fn from_state(state: &SessionPerformanceState, subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            level: state.level,
            level_history: state.level_history.clone(),
            total_correct: state.total_correct,
            total_attempts: state.total_attempts,
            accuracy: round1(state.accuracy_pct()),
            mastery: round1(state.mastery_score),
            cognitive_strain_index: round1(state.cognitive_strain_index),
            avg_response_time: round1(state.avg_response_time()),
            adaptive_mode: state.adaptive_mode,
            weaknesses: detect_weaknesses(state),
            recommendations: study_recommendations(state, subject),
            topic_accuracy: state.topic_accuracy.clone(),
            type_accuracy: state.type_accuracy.clone(),
            weakness_profile: state.weakness_profile.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(correct: u32, total: u32) -> AccuracyCounter {
        AccuracyCounter { correct, total }
    }

    fn sample_state() -> SessionPerformanceState {
        let mut state = SessionPerformanceState::new();
        state.topic_accuracy.insert("algebra".to_string(), counter(1, 3));
        state.topic_accuracy.insert("geometry".to_string(), counter(3, 4));
        state.topic_accuracy.insert("calculus".to_string(), counter(0, 1));
        state.type_accuracy.insert(QuestionType::TrueFalse, counter(1, 4));
        state.type_accuracy.insert(QuestionType::Mcq, counter(3, 4));
        state.total_correct = 4;
        state.total_attempts = 8;
        state
    }

    #[test]
    fn test_detect_weaknesses() {
        let weaknesses = detect_weaknesses(&sample_state());
        assert_eq!(
            weaknesses,
            vec![
                Weakness {
                    kind: WeaknessKind::Topic,
                    name: "algebra".to_string(),
                    accuracy: 33.3,
                },
                Weakness {
                    kind: WeaknessKind::QuestionType,
                    name: "true_false".to_string(),
                    accuracy: 25.0,
                },
            ]
        );
    }

    #[test]
    fn test_suggest_prefers_unattempted_topic() {
        let state = sample_state();
        assert_eq!(
            suggest_next_topic(&state, &["geometry", "statistics", "algebra"]),
            Some("statistics".to_string())
        );
        assert_eq!(
            suggest_next_topic(&state, &["geometry", "algebra", "calculus"]),
            Some("calculus".to_string())
        );
        assert_eq!(
            suggest_next_topic(&state, &["geometry", "algebra"]),
            Some("algebra".to_string())
        );
        assert_eq!(suggest_next_topic::<&str>(&state, &[]), None);
    }

    #[test]
    fn test_recommendations() {
        let mut state = sample_state();
        state.mastery_score = 45.0;
        state.correct_streak = 4;
        state.best_streak = 4;
        let recs = study_recommendations(&state, "Math");
        assert_eq!(
            recs,
            vec![
                "Solid progress. Continue practicing to strengthen weak areas.".to_string(),
                "Review algebra -- accuracy is 33.3%.".to_string(),
                "Practice more true false questions.".to_string(),
                "Current streak: 4 correct answers in a row.".to_string(),
            ]
        );

        state.mastery_score = 10.0;
        assert_eq!(
            study_recommendations(&state, "Math")[0],
            "Focus on building fundamentals in Math."
        );
    }

    #[test]
    fn test_progress_report() {
        let mut state = sample_state();
        state.response_times.push(10.0);
        state.response_times.push(15.0);
        let report = ProgressReport::from_state(&state, "Math");
        assert_eq!(report.accuracy, 50.0);
        assert_eq!(report.avg_response_time, 12.5);
        assert_eq!(report.weaknesses.len(), 2);
        assert_eq!(report.level, Level::Unknown);
    }
}
