//! Wizard — coordinates the two entry paths, backend calls, the reveal
//! gate, and lead submission.
//!
//! All backend traffic goes through the injected [`MatchingBackend`]; path
//! choice and partner attribution live in the injected [`KeyValueStore`].
//! Every logical operation is single-flight, and the quiz matching call is
//! memoized by answer fingerprint so re-triggers never duplicate requests.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::backend::MatchingBackend;
use crate::config::FlowConfig;
use crate::error::{Error, FlowError, Result, ValidationError};
use crate::lead::{BrokerInfo, LeadDraft, LeadRecord};
use crate::normalize::{normalize_quiz, normalize_search};
use crate::questions::{question_at, question_count, QuestionDefinition};
use crate::results::{MatchTeaser, ResultEnvelope, ResultsView, SearchQuery};
use crate::store::{storage_keys, KeyValueStore};

use super::state::{transition, FlowEvent, FlowStep};

/// Which entry flow the customer chose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PathChoice {
    #[default]
    #[serde(rename = "quiz")]
    Quiz,
    #[serde(rename = "direct-search")]
    DirectSearch,
}

/// Navigation intent emitted to the host; the core owns no URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    Home,
}

/// Outcome of a back request: either a step change inside the flow, or a
/// navigation intent for the host router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    Step(FlowStep),
    Navigate(NavIntent),
}

/// Makes shown when the makes endpoint is unreachable, so the direct form
/// stays usable.
const FALLBACK_MAKES: [&str; 10] = [
    "Toyota",
    "BMW",
    "Mercedes-Benz",
    "Audi",
    "Nissan",
    "Hyundai",
    "Kia",
    "Honda",
    "Mazda",
    "Subaru",
];

/// Mutable wizard state. One instance per session; single-shot until retake.
#[derive(Default)]
struct WizardState {
    step: FlowStep,
    path: PathChoice,
    answers: super::answers::AnswerSet,
    envelope: Option<ResultEnvelope>,
    /// Fingerprint of the answer set behind the last successful quiz fetch.
    quiz_fingerprint: Option<String>,
    draft: LeadDraft,
    lead_captured: bool,
    broker: Option<BrokerInfo>,
    submitted: Vec<LeadRecord>,

    query: SearchQuery,
    makes: Vec<String>,
    models: Vec<String>,
    /// Make the in-flight models fetch was dispatched for, if any.
    models_fetch_key: Option<String>,

    quiz_in_flight: bool,
    search_in_flight: bool,
    lead_in_flight: bool,
}

/// The wizard controller.
pub struct Wizard {
    backend: Arc<dyn MatchingBackend>,
    store: Arc<dyn KeyValueStore>,
    config: FlowConfig,
    state: RwLock<WizardState>,
}

impl Wizard {
    pub fn new(
        backend: Arc<dyn MatchingBackend>,
        store: Arc<dyn KeyValueStore>,
        config: FlowConfig,
    ) -> Self {
        Self {
            backend,
            store,
            config,
            state: RwLock::new(WizardState::default()),
        }
    }

    // ── Entry ───────────────────────────────────────────────────────

    /// Persist the customer's path choice (the home-screen selection).
    pub async fn choose_path(&self, choice: PathChoice) -> Result<()> {
        self.store
            .set(storage_keys::USER_PATH, serde_json::to_value(choice).map_err(crate::error::StoreError::from)?)
            .await?;
        Ok(())
    }

    /// Persist partner attribution picked up at entry (e.g. a tracking tag).
    pub async fn attach_broker(&self, name: &str) -> Result<()> {
        let info = BrokerInfo {
            name: name.to_string(),
            email: None,
        };
        self.store
            .set(
                storage_keys::BROKER_INFO,
                serde_json::to_value(&info).map_err(crate::error::StoreError::from)?,
            )
            .await?;
        Ok(())
    }

    /// Start the flow. Path resolution order: persisted choice, then the
    /// caller's navigation hint, then the quiz.
    pub async fn begin(&self, hint: Option<PathChoice>) -> Result<FlowStep> {
        let persisted: Option<PathChoice> = self
            .store
            .get(storage_keys::USER_PATH)
            .await?
            .and_then(|v| serde_json::from_value(v).ok());
        let path = persisted.or(hint).unwrap_or_default();

        let broker: Option<BrokerInfo> = self
            .store
            .get(storage_keys::BROKER_INFO)
            .await?
            .and_then(|v| serde_json::from_value(v).ok());

        let event = match path {
            PathChoice::Quiz => FlowEvent::BeginQuiz,
            PathChoice::DirectSearch => FlowEvent::BeginDirectSearch,
        };

        let mut state = self.state.write().await;
        let next = transition(state.step, event, question_count())?;
        state.step = next;
        state.path = path;
        state.broker = broker;
        tracing::info!(path = ?path, step = %next, "Flow started");
        Ok(next)
    }

    // ── Introspection ───────────────────────────────────────────────

    pub async fn current_step(&self) -> FlowStep {
        self.state.read().await.step
    }

    pub async fn path(&self) -> PathChoice {
        self.state.read().await.path
    }

    pub async fn lead_captured(&self) -> bool {
        self.state.read().await.lead_captured
    }

    /// The question currently on screen, if the flow is on one.
    pub async fn current_question(&self) -> Option<&'static QuestionDefinition> {
        match self.state.read().await.step {
            FlowStep::Question(i) => question_at(i),
            _ => None,
        }
    }

    /// Submitted lead history. Retake never clears this.
    pub async fn submitted_leads(&self) -> Vec<LeadRecord> {
        self.state.read().await.submitted.clone()
    }

    // ── Quiz path ───────────────────────────────────────────────────

    /// Record an answer. Idempotent overwrite; validates only that the id
    /// and value name a known question and option.
    pub async fn select_answer(&self, question_id: u8, value: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.answers.select(question_id, value)?;
        Ok(())
    }

    /// Move past the current question; the last question advances to the
    /// blurred results step.
    pub async fn advance(&self) -> Result<FlowStep> {
        let mut state = self.state.write().await;
        if let FlowStep::Question(i) = state.step {
            let question = question_at(i).expect("step index bounded by transition table");
            if state.answers.get(question.id).is_none() {
                return Err(ValidationError::Unanswered(question.id).into());
            }
        }
        let next = transition(state.step, FlowEvent::Advance, question_count())?;
        state.step = next;
        Ok(next)
    }

    /// Step backwards. At the flow entry this becomes a navigation intent
    /// for the host instead of a step change.
    pub async fn back(&self) -> Result<BackAction> {
        let mut state = self.state.write().await;
        if state.step == FlowStep::Start {
            return Ok(BackAction::Navigate(NavIntent::Home));
        }
        let next = transition(state.step, FlowEvent::Retreat, question_count())?;
        state.step = next;
        Ok(BackAction::Step(next))
    }

    /// Fetch quiz matches for the completed answer set.
    ///
    /// Requires all questions answered — an incomplete set fails locally
    /// with no backend call. At most one call per answer fingerprint: a
    /// re-trigger with unchanged answers returns the cached envelope.
    pub async fn load_quiz_matches(&self) -> Result<ResultEnvelope> {
        let (submission, fingerprint) = {
            let mut state = self.state.write().await;
            let fingerprint = state.answers.fingerprint();
            if state.quiz_fingerprint.as_deref() == Some(fingerprint.as_str()) {
                if let Some(envelope) = &state.envelope {
                    tracing::debug!("Answer fingerprint unchanged, reusing cached matches");
                    return Ok(envelope.clone());
                }
            }
            let submission = state.answers.to_submission()?;
            if state.quiz_in_flight {
                return Err(FlowError::SubmissionInFlight {
                    operation: "quiz matching",
                }
                .into());
            }
            state.quiz_in_flight = true;
            (submission, fingerprint)
        };

        let outcome = self.backend.submit_quiz(&submission).await;

        let mut state = self.state.write().await;
        state.quiz_in_flight = false;
        let payload = outcome.map_err(|e| {
            tracing::warn!(error = %e, "Quiz matching call failed");
            Error::from(e)
        })?;
        let envelope = normalize_quiz(&payload, &submission)?;
        state.envelope = Some(envelope.clone());
        state.quiz_fingerprint = Some(fingerprint);
        tracing::info!(matches = envelope.matches.len(), "Quiz matches loaded");
        Ok(envelope)
    }

    // ── Direct search path ──────────────────────────────────────────

    /// Load the make list. Falls back to a static list when the endpoint
    /// is unreachable so the form stays usable.
    pub async fn load_makes(&self) -> Result<Vec<String>> {
        let makes = match self.backend.fetch_makes().await {
            Ok(makes) => makes,
            Err(e) => {
                tracing::warn!(error = %e, "Makes fetch failed, using fallback list");
                FALLBACK_MAKES.iter().map(|m| m.to_string()).collect()
            }
        };
        let mut state = self.state.write().await;
        state.makes = makes.clone();
        Ok(makes)
    }

    /// Choose a make. Clears the chosen model and the loaded model list;
    /// any model fetch still in flight for the previous make becomes stale
    /// and will be discarded on arrival.
    pub async fn select_make(&self, make: &str) {
        let mut state = self.state.write().await;
        if state.query.make == make {
            return;
        }
        state.query.make = make.to_string();
        state.query.model.clear();
        state.models.clear();
    }

    /// Choose a model for the current make.
    pub async fn select_model(&self, model: &str) {
        self.state.write().await.query.model = model.to_string();
    }

    pub async fn set_looking_for(&self, looking_for: &str) {
        self.state.write().await.query.looking_for = looking_for.to_string();
    }

    pub async fn set_search_comments(&self, comments: &str) {
        self.state.write().await.query.comments = comments.to_string();
    }

    /// Makes loaded for the form.
    pub async fn available_makes(&self) -> Vec<String> {
        self.state.read().await.makes.clone()
    }

    /// Models loaded for the currently selected make.
    pub async fn available_models(&self) -> Vec<String> {
        self.state.read().await.models.clone()
    }

    /// Fetch models for the currently selected make.
    ///
    /// The request is keyed to the make at dispatch time; if the selection
    /// has moved on by the time the response arrives, the response is
    /// discarded and the newer make's list stands. Returns the list that
    /// is current after the call settles.
    pub async fn load_models(&self) -> Result<Vec<String>> {
        let key = {
            let mut state = self.state.write().await;
            if state.query.make.is_empty() {
                return Err(ValidationError::MissingField("make").into());
            }
            if state.models_fetch_key.as_deref() == Some(state.query.make.as_str()) {
                return Err(FlowError::SubmissionInFlight {
                    operation: "model list fetch",
                }
                .into());
            }
            let key = state.query.make.clone();
            state.models_fetch_key = Some(key.clone());
            key
        };

        let outcome = self.backend.fetch_models(&key).await;

        let mut state = self.state.write().await;
        if state.models_fetch_key.as_deref() == Some(key.as_str()) {
            state.models_fetch_key = None;
        }
        if state.query.make != key {
            tracing::debug!(
                stale_make = %key,
                current_make = %state.query.make,
                "Discarding superseded model list response"
            );
            return Ok(state.models.clone());
        }
        match outcome {
            Ok(models) => {
                state.models = models.clone();
                Ok(models)
            }
            Err(e) => {
                tracing::warn!(make = %key, error = %e, "Model list fetch failed");
                Err(e.into())
            }
        }
    }

    /// Submit the direct search. Requires make and model; success lands on
    /// the blurred results step, failure leaves the form editable.
    pub async fn submit_search(&self) -> Result<FlowStep> {
        let (request, query) = {
            let mut state = self.state.write().await;
            if state.step != FlowStep::DirectSearchInput {
                return Err(FlowError::InvalidTransition {
                    step: state.step.to_string(),
                    event: FlowEvent::SearchSucceeded.to_string(),
                }
                .into());
            }
            if state.query.make.trim().is_empty() || state.query.model.trim().is_empty() {
                return Err(ValidationError::MissingMakeModel.into());
            }
            if state.search_in_flight {
                return Err(FlowError::SubmissionInFlight {
                    operation: "search",
                }
                .into());
            }
            state.search_in_flight = true;
            let query = state.query.clone();
            let request = crate::backend::types::CarSearchRequest {
                make: query.make.clone(),
                model: query.model.clone(),
                looking_for: query.looking_for.clone(),
                additional_comments: if query.comments.trim().is_empty() {
                    None
                } else {
                    Some(query.comments.clone())
                },
            };
            (request, query)
        };

        let outcome = self.backend.search_cars(&request).await;

        let mut state = self.state.write().await;
        state.search_in_flight = false;
        match outcome {
            Ok(payload) => {
                let envelope = normalize_search(&payload, &query);
                let next = transition(state.step, FlowEvent::SearchSucceeded, question_count())?;
                tracing::info!(matches = envelope.matches.len(), "Search succeeded");
                state.envelope = Some(envelope);
                state.step = next;
                Ok(next)
            }
            Err(e) => {
                // Form state is untouched so the customer can retry as-is.
                tracing::warn!(error = %e, "Search failed");
                Err(e.into())
            }
        }
    }

    // ── Reveal gate & lead capture ──────────────────────────────────

    /// What may be rendered right now. Teasers only until a lead is
    /// captured, regardless of origin.
    pub async fn visible_results(&self) -> ResultsView {
        let state = self.state.read().await;
        match &state.envelope {
            None => ResultsView::Pending,
            Some(envelope) if state.lead_captured => ResultsView::Full(envelope.clone()),
            Some(envelope) => {
                ResultsView::Blurred(envelope.matches.iter().map(MatchTeaser::from).collect())
            }
        }
    }

    /// Ask to see the full results. Moves to the lead form; the gate
    /// itself only opens on a successful submission.
    pub async fn request_reveal(&self) -> Result<FlowStep> {
        let mut state = self.state.write().await;
        let next = transition(state.step, FlowEvent::RequestReveal, question_count())?;
        state.step = next;
        Ok(next)
    }

    /// Replace the lead draft. Kept verbatim across failed submissions.
    pub async fn set_draft(&self, draft: LeadDraft) {
        self.state.write().await.draft = draft;
    }

    pub async fn draft(&self) -> LeadDraft {
        self.state.read().await.draft.clone()
    }

    /// Submit the lead. Single-flight: a second call while one is pending
    /// is rejected locally. Success opens the reveal gate and finishes the
    /// flow; failure keeps the draft and the step.
    pub async fn submit_lead(&self) -> Result<LeadRecord> {
        let payload = {
            let mut state = self.state.write().await;
            if state.step != FlowStep::LeadCapture {
                return Err(FlowError::InvalidTransition {
                    step: state.step.to_string(),
                    event: FlowEvent::LeadSubmitted.to_string(),
                }
                .into());
            }
            if state.lead_in_flight {
                return Err(FlowError::SubmissionInFlight {
                    operation: "lead capture",
                }
                .into());
            }
            state.draft.validate(&self.config)?;
            let envelope = state
                .envelope
                .as_ref()
                .ok_or(ValidationError::MissingField("results"))?;
            let payload = state
                .draft
                .to_payload(envelope, state.broker.as_ref(), &self.config);
            state.lead_in_flight = true;
            payload
        };

        let outcome = self.backend.capture_lead(&payload).await;

        let mut state = self.state.write().await;
        state.lead_in_flight = false;
        match outcome {
            Ok(receipt) => {
                let next = transition(state.step, FlowEvent::LeadSubmitted, question_count())?;
                state.step = next;
                state.lead_captured = true;
                let record = LeadRecord {
                    receipt_id: receipt.id,
                    customer_name: payload.customer_name.clone(),
                    customer_email: payload.customer_email.clone(),
                    origin: state
                        .envelope
                        .as_ref()
                        .expect("envelope checked before dispatch")
                        .origin,
                    submitted_at: chrono::Utc::now(),
                };
                state.submitted.push(record.clone());
                tracing::info!(customer = %record.customer_name, "Lead captured, results revealed");
                Ok(record)
            }
            Err(e) => {
                let next = transition(state.step, FlowEvent::LeadFailed, question_count())?;
                state.step = next;
                tracing::warn!(error = %e, "Lead capture failed, draft preserved");
                Err(e.into())
            }
        }
    }

    // ── Retake ──────────────────────────────────────────────────────

    /// Reset every piece of transient state and return to the start.
    /// Already-submitted leads are history and stay untouched.
    pub async fn retake(&self) -> FlowStep {
        let mut state = self.state.write().await;
        state.step = transition(state.step, FlowEvent::Retake, question_count())
            .expect("retake is accepted from every step");
        state.answers.clear();
        state.envelope = None;
        state.quiz_fingerprint = None;
        state.draft = LeadDraft::default();
        state.lead_captured = false;
        state.query = SearchQuery::default();
        state.makes.clear();
        state.models.clear();
        state.models_fetch_key = None;
        state.quiz_in_flight = false;
        state.search_in_flight = false;
        state.lead_in_flight = false;
        tracing::info!("Flow reset");
        state.step
    }
}
