//! Lead capture — draft validation and the immutable submitted record.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::types::{LeadCapturePayload, SelectedCar};
use crate::config::FlowConfig;
use crate::error::ValidationError;
use crate::results::{CarMatch, OriginSource, ResultEnvelope};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Optional leading `+`, then up to 16 digits not starting with zero.
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").unwrap());

/// How the customer wants to be contacted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactMethod {
    #[default]
    Email,
    Phone,
    Either,
}

impl std::fmt::Display for ContactMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Either => "Either",
        };
        write!(f, "{s}")
    }
}

/// Broker/partner attribution read from the key-value store at entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Contact details the customer types before results are revealed.
/// Preserved verbatim across failed submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub preferred_contact: ContactMethod,
    pub comments: String,
}

impl LeadDraft {
    /// Local validation. Runs before any network call; a failure here keeps
    /// the draft editable and issues nothing.
    pub fn validate(&self, config: &FlowConfig) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.name.chars().count() > config.max_name_length {
            return Err(ValidationError::TooLong {
                field: "name",
                max: config.max_name_length,
            });
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if !EMAIL_PATTERN.is_match(self.email.trim()) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        if self.phone.trim().is_empty() {
            return Err(ValidationError::MissingField("phone"));
        }
        if !PHONE_PATTERN.is_match(self.phone.trim()) {
            return Err(ValidationError::InvalidPhone(self.phone.clone()));
        }
        if self.comments.chars().count() > config.max_comment_length {
            return Err(ValidationError::TooLong {
                field: "comments",
                max: config.max_comment_length,
            });
        }
        Ok(())
    }

    /// Build the wire payload for this draft against a result envelope.
    ///
    /// Attaches the top `results_to_show` matches and the snapshot that
    /// matches the envelope's origin; direct-search leads carry
    /// `quiz_answers: None`.
    pub fn to_payload(
        &self,
        envelope: &ResultEnvelope,
        broker: Option<&BrokerInfo>,
        config: &FlowConfig,
    ) -> LeadCapturePayload {
        let selected_cars = envelope
            .top_matches(config.results_to_show)
            .iter()
            .map(selected_car)
            .collect();

        LeadCapturePayload {
            customer_name: self.name.trim().to_string(),
            customer_email: self.email.trim().to_string(),
            customer_phone: self.phone.trim().to_string(),
            quiz_answers: envelope.quiz_answers.clone(),
            selected_cars,
            preferred_contact_method: self.preferred_contact.to_string(),
            additional_comments: if self.comments.trim().is_empty() {
                None
            } else {
                Some(self.comments.trim().to_string())
            },
            broker_name: broker
                .map(|b| b.name.clone())
                .unwrap_or_else(|| config.default_broker.clone()),
            broker_email: broker.and_then(|b| b.email.clone()),
            origin: envelope.origin.to_string(),
        }
    }
}

fn selected_car(car: &CarMatch) -> SelectedCar {
    SelectedCar {
        name: car.name.clone(),
        brand: car.brand.clone(),
        price_range: car.price_range.clone(),
        match_percentage: car.match_percentage,
        stock_level: car.stock_level.clone(),
        fuel_type: car.fuel_type.clone(),
        body_type: car.body_type.clone(),
        seats: car.seats.clone(),
        image_url: car.image_url.clone().unwrap_or_default(),
        vehicle_quality: car.quality_tier.clone(),
        weekly_repayment: car.weekly_repayment.clone(),
    }
}

/// A successfully submitted lead. Immutable; retake does not touch these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    /// Server-assigned id, when the backend returned one.
    pub receipt_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub origin: OriginSource,
    pub submitted_at: DateTime<Utc>,
}
