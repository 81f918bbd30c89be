//! Quiz items, answered set, and score
//!
//! Provider payloads are untrusted: [`parse_quiz_items`] is the only way to
//! turn one into [`QuizItem`]s, and it rejects anything that does not have
//! the expected shape before it can reach the scheduler.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::QuizError;
use super::scheduler::MIN_QUESTION_SPACING_SECS;

/// Number of questions generated per video
pub const QUESTION_COUNT: usize = 5;

/// One generated question bound to a playback timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    /// Unique within a session
    pub id: String,
    /// Target playback position in seconds
    pub timestamp: f64,
    pub question: String,
    /// At least two entries
    pub options: Vec<String>,
    /// Always a valid index into `options`
    pub correct_answer_index: usize,
    /// Shown after the learner answers
    pub feedback: String,
    /// Vocabulary term the question targets, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verb_focus: Option<String>,
}

impl QuizItem {
    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_answer_index
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_answer_index]
    }
}

/// Item as it arrives from the provider, before validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuizItem {
    #[serde(deserialize_with = "id_from_string_or_number")]
    id: String,
    timestamp: f64,
    question: String,
    options: Vec<String>,
    correct_answer_index: i64,
    feedback: String,
    #[serde(default)]
    verb_focus: Option<String>,
}

/// Models occasionally emit numeric ids; accept them as text
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

impl RawQuizItem {
    fn validate(self, position: usize) -> Result<QuizItem, QuizError> {
        let fail = |reason: String| {
            QuizError::Generation(format!("question {} is malformed: {}", position + 1, reason))
        };

        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(fail("empty id".into()));
        }
        if !self.timestamp.is_finite() || self.timestamp < 0.0 {
            return Err(fail(format!("invalid timestamp {}", self.timestamp)));
        }
        if self.question.trim().is_empty() {
            return Err(fail("empty question text".into()));
        }
        if self.options.len() < 2 {
            return Err(fail(format!("needs at least 2 options, got {}", self.options.len())));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(fail("blank answer option".into()));
        }
        let correct_answer_index = usize::try_from(self.correct_answer_index)
            .ok()
            .filter(|&i| i < self.options.len())
            .ok_or_else(|| {
                fail(format!(
                    "correct answer index {} out of range for {} options",
                    self.correct_answer_index,
                    self.options.len()
                ))
            })?;

        Ok(QuizItem {
            id,
            timestamp: self.timestamp,
            question: self.question.trim().to_string(),
            options: self.options,
            correct_answer_index,
            feedback: self.feedback.trim().to_string(),
            verb_focus: self.verb_focus.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()),
        })
    }
}

/// Validate a provider payload and return items sorted by timestamp,
/// re-spaced so no two are closer than [`MIN_QUESTION_SPACING_SECS`]
pub fn parse_quiz_items(payload: Value) -> Result<Vec<QuizItem>, QuizError> {
    let raw: Vec<RawQuizItem> = serde_json::from_value(payload).map_err(|e| {
        QuizError::Generation(format!("response did not match the question format: {}", e))
    })?;

    if raw.len() != QUESTION_COUNT {
        return Err(QuizError::Generation(format!(
            "expected {} questions, got {}",
            QUESTION_COUNT,
            raw.len()
        )));
    }

    let mut items = raw
        .into_iter()
        .enumerate()
        .map(|(i, item)| item.validate(i))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    if let Some(dup) = items.iter().find(|item| !seen.insert(item.id.as_str())) {
        return Err(QuizError::Generation(format!("duplicate question id \"{}\"", dup.id)));
    }

    items.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

    let moved = enforce_spacing(&mut items, MIN_QUESTION_SPACING_SECS);
    if moved > 0 {
        tracing::warn!("Re-spaced {} question(s) that were too close together", moved);
    }

    Ok(items)
}

/// Push timestamps forward until consecutive items are at least `min_gap`
/// apart. Expects `items` sorted by timestamp; returns how many moved.
pub fn enforce_spacing(items: &mut [QuizItem], min_gap: f64) -> usize {
    let mut moved = 0;
    for i in 1..items.len() {
        let earliest = items[i - 1].timestamp + min_gap;
        if items[i].timestamp < earliest {
            tracing::debug!(
                "Moving question {} from {:.1}s to {:.1}s",
                items[i].id,
                items[i].timestamp,
                earliest
            );
            items[i].timestamp = earliest;
            moved += 1;
        }
    }
    moved
}

/// Identifiers of resolved questions and whether each was answered correctly
#[derive(Debug, Clone, Default)]
pub struct AnsweredSet {
    outcomes: HashMap<String, bool>,
}

impl AnsweredSet {
    pub fn contains(&self, id: &str) -> bool {
        self.outcomes.contains_key(id)
    }

    /// Record an outcome; returns `false` if the id was already resolved
    pub fn record(&mut self, id: impl Into<String>, correct: bool) -> bool {
        let id = id.into();
        if self.outcomes.contains_key(&id) {
            return false;
        }
        self.outcomes.insert(id, correct);
        true
    }

    /// `Some(correct)` if resolved
    pub fn outcome(&self, id: &str) -> Option<bool> {
        self.outcomes.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn clear(&mut self) {
        self.outcomes.clear();
    }
}

/// Running score for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
}

impl Score {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Percentage correct, 0 when nothing was attempted
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct as f64 / self.total as f64) * 100.0).round() as u8
    }
}
