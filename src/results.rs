//! Unified result contract — one envelope regardless of which entry path
//! produced the matches, plus the reveal-gated views over it.

use serde::{Deserialize, Serialize};

use crate::backend::types::QuizSubmission;

/// Which entry flow produced a result envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginSource {
    Quiz,
    Direct,
}

impl std::fmt::Display for OriginSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Quiz => "quiz",
            Self::Direct => "direct",
        };
        write!(f, "{s}")
    }
}

/// Structured query built on the direct-search path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// "New Vehicle" or "Used Vehicle".
    pub looking_for: String,
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub comments: String,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            looking_for: "New Vehicle".to_string(),
            make: String::new(),
            model: String::new(),
            comments: String::new(),
        }
    }
}

/// A fully-populated car match. Every field is concrete: gaps in the raw
/// payload were filled from the placeholder table during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarMatch {
    pub name: String,
    pub brand: String,
    pub price_range: String,
    /// 0..=100.
    pub match_percentage: u8,
    pub stock_level: String,
    pub fuel_type: String,
    pub body_type: String,
    pub seats: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub quality_tier: String,
    pub weekly_repayment: String,
}

/// Unified result envelope.
///
/// Invariant: exactly one of `quiz_answers`/`search_query` is populated,
/// and it matches `origin`. The constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub matches: Vec<CarMatch>,
    pub explanation: String,
    pub total_matches: usize,
    pub origin: OriginSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_answers: Option<QuizSubmission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<SearchQuery>,
}

impl ResultEnvelope {
    pub(crate) fn from_quiz(
        matches: Vec<CarMatch>,
        explanation: String,
        total_matches: usize,
        answers: QuizSubmission,
    ) -> Self {
        Self {
            matches,
            explanation,
            total_matches,
            origin: OriginSource::Quiz,
            quiz_answers: Some(answers),
            search_query: None,
        }
    }

    pub(crate) fn from_direct(
        matches: Vec<CarMatch>,
        explanation: String,
        query: SearchQuery,
    ) -> Self {
        let total_matches = matches.len();
        Self {
            matches,
            explanation,
            total_matches,
            origin: OriginSource::Direct,
            quiz_answers: None,
            search_query: Some(query),
        }
    }

    /// The matches a lead submission attaches, in match order.
    pub fn top_matches(&self, count: usize) -> &[CarMatch] {
        &self.matches[..self.matches.len().min(count)]
    }
}

/// Truncated identifying fields shown while results are still gated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchTeaser {
    pub name: String,
    pub brand: String,
    pub match_percentage: u8,
}

impl From<&CarMatch> for MatchTeaser {
    fn from(car: &CarMatch) -> Self {
        Self {
            name: car.name.clone(),
            brand: car.brand.clone(),
            match_percentage: car.match_percentage,
        }
    }
}

/// What the caller is allowed to render right now.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    /// No envelope yet.
    Pending,
    /// Lead not captured: teasers only, explanation withheld.
    Blurred(Vec<MatchTeaser>),
    /// Lead captured: the full envelope.
    Full(ResultEnvelope),
}
