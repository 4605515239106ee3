//! Wire types for the matching backend.
//!
//! These mirror the backend's JSON contracts exactly; everything here is
//! serde-shaped for the wire, not for display. Display types live in
//! [`crate::results`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Response envelope ───────────────────────────────────────────────

/// Generic `{success, message, data}` envelope every endpoint responds with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

// ── Requests ────────────────────────────────────────────────────────

/// Completed quiz answers, keyed the way the matching endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub body_type: String,
    pub budget_range: String,
    pub seats_needed: String,
    pub vehicle_quality: String,
    pub fuel_preference: String,
    pub timeframe: String,
}

/// Direct make/model search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarSearchRequest {
    pub make: String,
    pub model: String,
    pub looking_for: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_comments: Option<String>,
}

/// Lead capture request. `quiz_answers` is null for direct-search leads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadCapturePayload {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub quiz_answers: Option<QuizSubmission>,
    pub selected_cars: Vec<SelectedCar>,
    pub preferred_contact_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_comments: Option<String>,
    pub broker_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_email: Option<String>,
    /// Which entry flow produced this lead: `"quiz"` or `"direct"`.
    pub origin: String,
}

/// A car attached to a lead submission. Every field is concrete — missing
/// data was filled with placeholders before this struct is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedCar {
    pub name: String,
    pub brand: String,
    pub price_range: String,
    pub match_percentage: u8,
    pub stock_level: String,
    pub fuel_type: String,
    pub body_type: String,
    pub seats: String,
    pub image_url: String,
    pub vehicle_quality: String,
    pub weekly_repayment: String,
}

/// Server acknowledgement of a captured lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadReceipt {
    pub success: bool,
    #[serde(default)]
    pub id: Option<Uuid>,
}

// ── Raw result payloads ─────────────────────────────────────────────

/// Raw quiz matching response: `{matches: [...], explanation}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuizPayload {
    pub matches: Vec<RawCar>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub total_matches: Option<usize>,
}

/// Raw direct-search response: `{cars: [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSearchPayload {
    pub cars: Vec<RawCar>,
}

/// One car as the backend sends it. Field presence varies by endpoint and
/// inventory row, so everything is optional here; the normalizer fills the
/// gaps from its placeholder table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCar {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price_range: Option<String>,
    /// Score from the quiz matcher. Takes precedence over `match_percentage`.
    #[serde(default)]
    pub match_score: Option<i64>,
    #[serde(default)]
    pub match_percentage: Option<i64>,
    #[serde(default)]
    pub stock_level: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub seats: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub vehicle_quality: Option<String>,
    #[serde(default)]
    pub weekly_repayment: Option<String>,
}
