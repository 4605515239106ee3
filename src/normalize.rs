//! Result normalization — maps either raw backend payload into one
//! [`ResultEnvelope`].
//!
//! Pure functions: shared-reference inputs, no mutation, no hidden state.
//! Identical input always yields an identical envelope.

use crate::backend::types::{QuizSubmission, RawCar, RawQuizPayload, RawSearchPayload};
use crate::error::NormalizationError;
use crate::results::{CarMatch, ResultEnvelope, SearchQuery};

/// Match percentage for a quiz match that carries neither `match_score`
/// nor `match_percentage`. Midpoint of the scale: unknown, not bad.
pub const NEUTRAL_MATCH_PERCENTAGE: u8 = 50;

/// Direct-search results are exact make/model hits, so they get a fixed
/// high percentage when the backend sends none.
const DIRECT_MATCH_PERCENTAGE: u8 = 95;

/// Placeholder values for fields the backend left out.
pub mod placeholders {
    pub const NAME: &str = "Unknown Car";
    pub const BRAND: &str = "Unknown Brand";
    pub const PRICE_RANGE: &str = "Contact for pricing";
    pub const STOCK_LEVEL: &str = "Available";
    pub const FUEL_TYPE: &str = "Petrol";
    pub const BODY_TYPE: &str = "Car";
    pub const SEATS: &str = "5";
    pub const QUALITY_TIER: &str = "Premium";
    pub const WEEKLY_REPAYMENT: &str = "Contact for quote";
}

/// Percentage precedence: `match_score`, then `match_percentage`, then the
/// supplied fallback. Out-of-range values clamp to 0..=100.
fn resolve_percentage(car: &RawCar, fallback: u8) -> u8 {
    car.match_score
        .or(car.match_percentage)
        .map(|raw| raw.clamp(0, 100) as u8)
        .unwrap_or(fallback)
}

/// Fill one raw car into a concrete [`CarMatch`]. Never drops the car.
fn fill_car(car: &RawCar, percentage_fallback: u8) -> CarMatch {
    let non_empty = |value: &Option<String>, default: &str| -> String {
        match value {
            Some(v) if !v.trim().is_empty() => v.clone(),
            _ => default.to_string(),
        }
    };

    CarMatch {
        name: non_empty(&car.name, placeholders::NAME),
        brand: non_empty(&car.brand, placeholders::BRAND),
        price_range: non_empty(&car.price_range, placeholders::PRICE_RANGE),
        match_percentage: resolve_percentage(car, percentage_fallback),
        stock_level: non_empty(&car.stock_level, placeholders::STOCK_LEVEL),
        fuel_type: non_empty(&car.fuel_type, placeholders::FUEL_TYPE),
        body_type: non_empty(&car.body_type, placeholders::BODY_TYPE),
        seats: non_empty(&car.seats, placeholders::SEATS),
        image_url: car
            .image_url
            .as_ref()
            .filter(|url| !url.trim().is_empty())
            .cloned(),
        quality_tier: non_empty(&car.vehicle_quality, placeholders::QUALITY_TIER),
        weekly_repayment: non_empty(&car.weekly_repayment, placeholders::WEEKLY_REPAYMENT),
    }
}

/// Normalize a quiz matching payload.
///
/// The answers snapshot is embedded so the envelope stays self-describing
/// through lead capture.
pub fn normalize_quiz(
    payload: &RawQuizPayload,
    answers: &QuizSubmission,
) -> Result<ResultEnvelope, NormalizationError> {
    if payload.matches.is_empty() {
        return Err(NormalizationError::EmptyMatches);
    }

    let matches: Vec<CarMatch> = payload
        .matches
        .iter()
        .map(|car| fill_car(car, NEUTRAL_MATCH_PERCENTAGE))
        .collect();

    let explanation = payload
        .explanation
        .as_ref()
        .filter(|e| !e.trim().is_empty())
        .cloned()
        .ok_or(NormalizationError::MissingField("explanation"))?;

    let total = payload.total_matches.unwrap_or(matches.len());
    Ok(ResultEnvelope::from_quiz(
        matches,
        explanation,
        total,
        answers.clone(),
    ))
}

/// Normalize a direct-search payload. The explanation is synthesized from
/// the searched make/model; `total_matches` is the car count.
pub fn normalize_search(payload: &RawSearchPayload, query: &SearchQuery) -> ResultEnvelope {
    let matches: Vec<CarMatch> = payload
        .cars
        .iter()
        .map(|car| fill_car(car, DIRECT_MATCH_PERCENTAGE))
        .collect();

    let explanation = format!(
        "Based on your search for {} {}, we found these available options that match your criteria.",
        query.make, query.model
    );

    ResultEnvelope::from_direct(matches, explanation, query.clone())
}
