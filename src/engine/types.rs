use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::engine::window::BoundedSet;

pub const RESPONSE_TIME_CAPACITY: usize = 50;
pub const ROLLING_RESULT_CAPACITY: usize = 20;
pub const RECURRING_PATTERN_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    TrueFalse,
    #[serde(alias = "short")]
    ShortAnswer,
    #[serde(alias = "qa")]
    OpenEnded,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        Self::Mcq,
        Self::TrueFalse,
        Self::ShortAnswer,
        Self::OpenEnded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcq => "mcq",
            Self::TrueFalse => "true_false",
            Self::ShortAnswer => "short_answer",
            Self::OpenEnded => "open_ended",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "mcq" | "multiple_choice" => Some(Self::Mcq),
            "true_false" | "truefalse" | "tf" => Some(Self::TrueFalse),
            "short_answer" | "short" => Some(Self::ShortAnswer),
            "open_ended" | "qa" | "open" => Some(Self::OpenEnded),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveMode {
    FluencyTraining,
    ConceptReinforcement,
    CognitiveOverload,
    Standard,
}

impl AdaptiveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FluencyTraining => "fluency_training",
            Self::ConceptReinforcement => "concept_reinforcement",
            Self::CognitiveOverload => "cognitive_overload",
            Self::Standard => "standard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum Level {
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "unknown" => Some(Self::Unknown),
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    pub fn is_diagnosed(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// One tier up; `Advanced` and `Unknown` stay put.
    pub fn harder(&self) -> Self {
        match self {
            Self::Beginner => Self::Intermediate,
            Self::Intermediate | Self::Advanced => Self::Advanced,
            Self::Unknown => Self::Unknown,
        }
    }

    /// One tier down; `Beginner` and `Unknown` stay put.
    pub fn easier(&self) -> Self {
        match self {
            Self::Advanced => Self::Intermediate,
            Self::Intermediate | Self::Beginner => Self::Beginner,
            Self::Unknown => Self::Unknown,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressAction {
    SwitchToReview,
    MicroBreak,
    SimplifiedExplanation,
}

impl StressAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SwitchToReview => "switch_to_review",
            Self::MicroBreak => "micro_break",
            Self::SimplifiedExplanation => "simplified_explanation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccuracyCounter {
    pub correct: u32,
    pub total: u32,
}

impl AccuracyCounter {
    pub fn record(&mut self, was_correct: bool) {
        self.total += 1;
        if was_correct {
            self.correct += 1;
        }
    }

    /// Accuracy in percent, `None` before the first attempt.
    pub fn accuracy_pct(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64 * 100.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaknessRecord {
    pub mastery_score: f64,
    pub error_types: BTreeSet<QuestionType>,
    pub recurring_patterns: BoundedSet<String, RECURRING_PATTERN_CAPACITY>,
    pub last_updated: DateTime<Utc>,
}

impl WeaknessRecord {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            mastery_score: 0.0,
            error_types: BTreeSet::new(),
            recurring_patterns: BoundedSet::new(),
            last_updated: now,
        }
    }
}

/// One answered question as received from the caller. Every field is
/// optional on the wire; bad values are defaulted by the engine, never rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerSubmission {
    #[serde(default, deserialize_with = "lenient_string")]
    pub question_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub topic: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub question_type: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub expected_answer: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub submitted_answer: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub response_time_seconds: Option<f64>,
}

impl AnswerSubmission {
    pub fn new(
        topic: impl Into<String>,
        question_type: QuestionType,
        expected_answer: impl Into<String>,
        submitted_answer: impl Into<String>,
        response_time_seconds: f64,
    ) -> Self {
        Self {
            question_id: String::new(),
            topic: topic.into(),
            question_type: question_type.as_str().to_string(),
            expected_answer: Some(expected_answer.into()),
            submitted_answer: Some(submitted_answer.into()),
            response_time_seconds: Some(response_time_seconds),
        }
    }

    pub fn with_question_id(mut self, question_id: impl Into<String>) -> Self {
        self.question_id = question_id.into();
        self
    }
}

/// One exercise worth of answers, processed as a single submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseSubmission {
    #[serde(default)]
    pub answers: Vec<AnswerSubmission>,
    /// Fallback for answers that carry no response time of their own.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub total_time_seconds: Option<f64>,
}

impl ExerciseSubmission {
    pub fn new(answers: Vec<AnswerSubmission>) -> Self {
        Self {
            answers,
            total_time_seconds: None,
        }
    }

    pub fn with_total_time(mut self, seconds: f64) -> Self {
        self.total_time_seconds = Some(seconds);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub accuracy: f64,
    pub correct: u32,
    pub total: u32,
    pub new_level: Level,
    pub level_changed: bool,
    pub mastery: f64,
    pub adaptive_mode: Option<AdaptiveMode>,
    pub cognitive_strain_index: f64,
    pub avg_response_time: f64,
    pub stress_detected: bool,
    pub recommended_action: Option<StressAction>,
}

/// Strings pass through, numbers and booleans keep their JSON spelling,
/// anything else becomes `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

/// Accepts numbers and numeric strings; anything else becomes `None`.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
