//! Answer collection for the quiz path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::backend::types::QuizSubmission;
use crate::error::ValidationError;
use crate::questions::{question_by_id, question_count};

/// Ordered map of question id → selected option value.
///
/// Grows additively: selecting a new option for an already-answered
/// question overwrites. Cleared on retake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet {
    answers: BTreeMap<u8, String>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer. The id must name a known question and the value
    /// must match one of its options; nothing else is validated.
    pub fn select(&mut self, question_id: u8, value: impl Into<String>) -> Result<(), ValidationError> {
        let value = value.into();
        let question =
            question_by_id(question_id).ok_or(ValidationError::UnknownQuestion(question_id))?;
        if !question.has_option(&value) {
            return Err(ValidationError::UnknownOption { question_id, value });
        }
        self.answers.insert(question_id, value);
        Ok(())
    }

    pub fn get(&self, question_id: u8) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Whether every question in the catalog has an answer.
    pub fn is_complete(&self) -> bool {
        self.answers.len() >= question_count()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    /// Deterministic identity of the current answers, used to suppress
    /// duplicate matching calls. Two sets with the same answers in any
    /// insertion order produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut parts = Vec::with_capacity(self.answers.len());
        for (id, value) in &self.answers {
            parts.push(format!("{id}={value}"));
        }
        parts.join("|")
    }

    /// Convert to the backend submission shape. Fails locally if any
    /// question is unanswered — the matching call must never be issued for
    /// an incomplete set.
    pub fn to_submission(&self) -> Result<QuizSubmission, ValidationError> {
        if !self.is_complete() {
            return Err(ValidationError::IncompleteAnswers {
                answered: self.answers.len(),
                required: question_count(),
            });
        }
        let field = |id: u8| -> Result<String, ValidationError> {
            self.answers
                .get(&id)
                .cloned()
                .ok_or(ValidationError::Unanswered(id))
        };
        Ok(QuizSubmission {
            body_type: field(1)?,
            budget_range: field(2)?,
            seats_needed: field(3)?,
            vehicle_quality: field(4)?,
            fuel_preference: field(5)?,
            timeframe: field(6)?,
        })
    }
}
