//! Error types for the car discovery wizard.

use std::time::Duration;

/// Top-level error type for the wizard core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Normalization error: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Local input validation failures. These block a transition and never
/// issue a backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Quiz incomplete: {answered} of {required} questions answered")]
    IncompleteAnswers { answered: usize, required: usize },

    #[error("Unknown question id: {0}")]
    UnknownQuestion(u8),

    #[error("\"{value}\" is not an option for question {question_id}")]
    UnknownOption { question_id: u8, value: String },

    #[error("Question {0} has not been answered")]
    Unanswered(u8),

    #[error("Both make and model must be selected")]
    MissingMakeModel,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Backend call failures. Timeout is distinguished from other network
/// failures so callers can surface it as its own retry prompt.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Whether retrying the same request could reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidResponse(_))
    }
}

/// Flow state machine violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("Event {event} is not valid in step {step}")]
    InvalidTransition { step: String, event: String },

    #[error("A {operation} request is already in flight")]
    SubmissionInFlight { operation: &'static str },
}

/// Malformed upstream payload. Non-fatal: the flow stays where it is and
/// the caller shows a generic retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    #[error("Payload is missing required field: {0}")]
    MissingField(&'static str),

    #[error("Payload contained no matches")]
    EmptyMatches,
}

/// Key-value collaborator failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read key {key}: {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write key {key}: {reason}")]
    Write { key: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for the wizard core.
pub type Result<T> = std::result::Result<T, Error>;
