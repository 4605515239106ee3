//! Matching backend collaborator.
//!
//! The wizard core talks to the backend exclusively through the
//! [`MatchingBackend`] trait; [`http::HttpMatchingBackend`] is the bundled
//! JSON-over-HTTP implementation. Tests substitute their own mocks.

pub mod http;
pub mod types;

pub use http::HttpMatchingBackend;
pub use types::{
    ApiEnvelope, CarSearchRequest, LeadCapturePayload, LeadReceipt, QuizSubmission, RawCar,
    RawQuizPayload, RawSearchPayload, SelectedCar,
};

use async_trait::async_trait;

use crate::error::ApiError;

/// Async seam to the car-matching backend. All calls are single requests
/// with a bounded timeout; retry policy belongs to the caller.
#[async_trait]
pub trait MatchingBackend: Send + Sync {
    /// All available makes.
    async fn fetch_makes(&self) -> Result<Vec<String>, ApiError>;

    /// Models for one make.
    async fn fetch_models(&self, make: &str) -> Result<Vec<String>, ApiError>;

    /// Direct make/model inventory search.
    async fn search_cars(&self, request: &CarSearchRequest)
        -> Result<RawSearchPayload, ApiError>;

    /// Submit completed quiz answers for matching.
    async fn submit_quiz(&self, submission: &QuizSubmission)
        -> Result<RawQuizPayload, ApiError>;

    /// Capture a lead.
    async fn capture_lead(&self, lead: &LeadCapturePayload) -> Result<LeadReceipt, ApiError>;
}
