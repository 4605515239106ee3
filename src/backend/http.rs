//! HTTP implementation of [`MatchingBackend`] over the backend's JSON API.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::types::{
    ApiEnvelope, CarSearchRequest, LeadCapturePayload, LeadReceipt, QuizSubmission,
    RawQuizPayload, RawSearchPayload,
};
use super::MatchingBackend;
use crate::error::ApiError;

/// JSON-over-HTTP matching backend.
pub struct HttpMatchingBackend {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpMatchingBackend {
    /// Create a backend client. `base_url` has no trailing slash, e.g.
    /// `http://localhost:8000`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                timeout: self.timeout,
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }

    /// Run a request and unwrap the `{success, message, data}` envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            // FastAPI-style errors carry a `detail` field; fall back to the body.
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
                .unwrap_or(body);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        if !envelope.success {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: envelope.message,
            });
        }
        envelope
            .data
            .ok_or_else(|| ApiError::InvalidResponse("envelope has no data".to_string()))
    }
}

/// `data` shape of the makes endpoint.
#[derive(serde::Deserialize)]
struct MakesData {
    makes: Vec<String>,
}

/// `data` shape of the models endpoint.
#[derive(serde::Deserialize)]
struct ModelsData {
    models: Vec<String>,
}

/// `data` shape of the lead capture endpoint.
#[derive(serde::Deserialize)]
struct LeadData {
    #[serde(default)]
    id: Option<uuid::Uuid>,
}

#[async_trait]
impl MatchingBackend for HttpMatchingBackend {
    async fn fetch_makes(&self) -> Result<Vec<String>, ApiError> {
        let data: MakesData = self
            .execute(self.client.get(self.url("/api/cars/makes")))
            .await?;
        Ok(data.makes)
    }

    async fn fetch_models(&self, make: &str) -> Result<Vec<String>, ApiError> {
        let data: ModelsData = self
            .execute(
                self.client
                    .get(self.url("/api/cars/models"))
                    .query(&[("make", make)]),
            )
            .await?;
        Ok(data.models)
    }

    async fn search_cars(
        &self,
        request: &CarSearchRequest,
    ) -> Result<RawSearchPayload, ApiError> {
        tracing::debug!(make = %request.make, model = %request.model, "Searching inventory");
        self.execute(self.client.post(self.url("/api/cars/search")).json(request))
            .await
    }

    async fn submit_quiz(
        &self,
        submission: &QuizSubmission,
    ) -> Result<RawQuizPayload, ApiError> {
        tracing::debug!(
            budget = %submission.budget_range,
            quality = %submission.vehicle_quality,
            "Submitting quiz for matching"
        );
        self.execute(
            self.client
                .post(self.url("/api/quiz/submit"))
                .json(submission),
        )
        .await
    }

    async fn capture_lead(&self, lead: &LeadCapturePayload) -> Result<LeadReceipt, ApiError> {
        tracing::info!(customer = %lead.customer_name, origin = %lead.origin, "Capturing lead");
        let data: LeadData = self
            .execute(
                self.client
                    .post(self.url("/api/leads/capture"))
                    .json(lead),
            )
            .await?;
        Ok(LeadReceipt {
            success: true,
            id: data.id,
        })
    }
}
