use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::engine::config::WeaknessParams;
use crate::engine::types::{AccuracyCounter, QuestionType, WeaknessRecord};

/// A topic needs this many attempts before it can enter the weakness profile.
pub const PROFILE_MIN_ATTEMPTS: u32 = 2;

const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "also", "because", "been", "before", "being",
    "below", "between", "both", "could", "does", "doing", "down", "during", "each", "from",
    "further", "have", "having", "here", "into", "just", "know", "like", "maybe", "more", "most",
    "only", "other", "over", "same", "should", "some", "such", "than", "that", "their", "them",
    "then", "there", "these", "they", "think", "this", "those", "through", "under", "until",
    "very", "were", "what", "when", "where", "which", "while", "will", "with", "would", "your",
];

pub struct WeaknessObservation<'a> {
    pub topic: &'a str,
    pub question_type: Option<QuestionType>,
    pub was_correct: bool,
    pub incorrect_answer_text: Option<&'a str>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaknessChange {
    /// Too few attempts to judge the topic yet.
    Unrated,
    /// Topic is (still) in the profile.
    Weak,
    /// Topic just left the profile.
    Recovered,
    /// Topic is rated and not weak.
    Strong,
}

pub struct WeaknessProfiler {
    params: WeaknessParams,
}

impl Default for WeaknessProfiler {
    fn default() -> Self {
        Self::new(WeaknessParams::default())
    }
}

impl WeaknessProfiler {
    pub fn new(params: WeaknessParams) -> Self {
        Self { params }
    }

    /// Records one answer against its topic and upserts or prunes the topic's
    /// weakness record. Recovery drops the whole record, patterns included.
    pub fn update(
        &self,
        topic_accuracy: &mut BTreeMap<String, AccuracyCounter>,
        profile: &mut BTreeMap<String, WeaknessRecord>,
        obs: &WeaknessObservation<'_>,
    ) -> WeaknessChange {
        let counter = topic_accuracy.entry(obs.topic.to_string()).or_default();
        counter.record(obs.was_correct);
        let counter = *counter;

        if counter.total < PROFILE_MIN_ATTEMPTS {
            return WeaknessChange::Unrated;
        }
        let mastery_score = counter.accuracy_pct().unwrap_or(0.0);

        let recovered = mastery_score >= self.params.mastery_threshold
            && counter.total >= self.params.recovery_attempts;
        if recovered {
            return if profile.remove(obs.topic).is_some() {
                WeaknessChange::Recovered
            } else {
                WeaknessChange::Strong
            };
        }

        let record = profile
            .entry(obs.topic.to_string())
            .or_insert_with(|| WeaknessRecord::new(obs.now));
        record.mastery_score = mastery_score;
        record.last_updated = obs.now;

        if !obs.was_correct {
            if let Some(qtype) = obs.question_type {
                record.error_types.insert(qtype);
            }
            if let Some(text) = obs.incorrect_answer_text {
                for keyword in self.extract_keywords(text) {
                    record.recurring_patterns.insert(keyword);
                }
            }
        }

        WeaknessChange::Weak
    }

    /// Lowercased alphabetic tokens longer than three characters, stopwords
    /// removed, first occurrences only.
    pub fn extract_keywords(&self, text: &str) -> Vec<String> {
        let mut keywords: Vec<String> = Vec::new();
        for token in text.split(|c: char| !c.is_alphabetic()) {
            if keywords.len() >= self.params.keywords_per_answer {
                break;
            }
            if token.chars().count() < self.params.keyword_min_len {
                continue;
            }
            let token = token.to_lowercase();
            if STOPWORDS.contains(&token.as_str()) || keywords.contains(&token) {
                continue;
            }
            keywords.push(token);
        }
        keywords
    }
}
