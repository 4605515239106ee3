//! End-to-end wizard flows against a scripted mock backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use car_quiz::backend::types::{
    CarSearchRequest, LeadCapturePayload, LeadReceipt, QuizSubmission, RawQuizPayload,
    RawSearchPayload,
};
use car_quiz::backend::MatchingBackend;
use car_quiz::error::{ApiError, Error, FlowError, ValidationError};
use car_quiz::questions::quiz_questions;
use car_quiz::store::MemoryStore;
use car_quiz::{FlowConfig, FlowStep, LeadDraft, OriginSource, PathChoice, ResultsView, Wizard};

/// A gate that lets a test observe a call entering the backend and decide
/// when it returns.
struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Notify::new(),
        })
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// Scripted backend with call counters and per-operation gates.
#[derive(Default)]
struct MockBackend {
    models_by_make: HashMap<String, Vec<String>>,
    quiz_calls: AtomicUsize,
    lead_calls: AtomicUsize,
    fail_lead: AtomicBool,
    model_gates: Mutex<HashMap<String, Arc<Gate>>>,
    lead_gate: Mutex<Option<Arc<Gate>>>,
    last_lead: Mutex<Option<LeadCapturePayload>>,
}

impl MockBackend {
    fn new() -> Self {
        let mut models_by_make = HashMap::new();
        models_by_make.insert(
            "Toyota".to_string(),
            vec!["RAV4".to_string(), "Corolla".to_string()],
        );
        models_by_make.insert(
            "BMW".to_string(),
            vec!["3 Series".to_string(), "X5".to_string()],
        );
        models_by_make.insert("Ford".to_string(), vec!["Ranger".to_string()]);
        Self {
            models_by_make,
            ..Self::default()
        }
    }

    /// Hold the next models fetch for `make` until the gate is released.
    async fn hold_models(&self, make: &str) -> Arc<Gate> {
        let gate = Gate::new();
        self.model_gates
            .lock()
            .await
            .insert(make.to_string(), gate.clone());
        gate
    }

    /// Hold the next lead capture until the gate is released.
    async fn hold_lead(&self) -> Arc<Gate> {
        let gate = Gate::new();
        *self.lead_gate.lock().await = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl MatchingBackend for MockBackend {
    async fn fetch_makes(&self) -> Result<Vec<String>, ApiError> {
        Ok(self.models_by_make.keys().cloned().collect())
    }

    async fn fetch_models(&self, make: &str) -> Result<Vec<String>, ApiError> {
        let gate = self.model_gates.lock().await.get(make).cloned();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        Ok(self.models_by_make.get(make).cloned().unwrap_or_default())
    }

    async fn search_cars(
        &self,
        request: &CarSearchRequest,
    ) -> Result<RawSearchPayload, ApiError> {
        let payload = serde_json::json!({
            "cars": [
                {"name": request.model, "brand": request.make, "price_range": "$50k-$70k",
                 "stock_level": "High", "fuel_type": "Petrol", "body_type": "Ute", "seats": "5"},
                {"name": format!("{} XLT", request.model), "brand": request.make},
                {"name": format!("{} Sport", request.model), "brand": request.make},
            ]
        });
        Ok(serde_json::from_value(payload).unwrap())
    }

    async fn submit_quiz(
        &self,
        _submission: &QuizSubmission,
    ) -> Result<RawQuizPayload, ApiError> {
        self.quiz_calls.fetch_add(1, Ordering::SeqCst);
        let payload = serde_json::json!({
            "matches": [
                {"name": "RAV4 Hybrid", "brand": "Toyota", "match_score": 92,
                 "price_range": "$45k-$55k", "stock_level": "High", "fuel_type": "Hybrid",
                 "body_type": "SUV", "seats": "5", "weekly_repayment": "$280"},
                {"name": "CX-5", "brand": "Mazda", "match_percentage": 84},
                {"name": "Sportage", "brand": "Kia"}
            ],
            "explanation": "These fit your budget and seating needs.",
            "total_matches": 3
        });
        Ok(serde_json::from_value(payload).unwrap())
    }

    async fn capture_lead(&self, lead: &LeadCapturePayload) -> Result<LeadReceipt, ApiError> {
        let gate = self.lead_gate.lock().await.take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.fail_lead.load(Ordering::SeqCst) {
            return Err(ApiError::Server {
                status: 500,
                message: "email dispatch failed".to_string(),
            });
        }
        self.lead_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_lead.lock().await = Some(lead.clone());
        Ok(LeadReceipt {
            success: true,
            id: Some(uuid::Uuid::new_v4()),
        })
    }
}

fn wizard_with(backend: Arc<MockBackend>) -> Wizard {
    Wizard::new(backend, Arc::new(MemoryStore::new()), FlowConfig::default())
}

/// Answer every question with its first option and advance to the results.
async fn complete_quiz(wizard: &Wizard) {
    for question in quiz_questions() {
        wizard
            .select_answer(question.id, question.options[0].value)
            .await
            .unwrap();
        wizard.advance().await.unwrap();
    }
}

fn draft() -> LeadDraft {
    LeadDraft {
        name: "Jo Citizen".into(),
        email: "jo@example.com".into(),
        phone: "+61400123456".into(),
        ..LeadDraft::default()
    }
}

#[tokio::test]
async fn quiz_flow_end_to_end() {
    let backend = Arc::new(MockBackend::new());
    let wizard = wizard_with(backend.clone());

    assert_eq!(wizard.begin(None).await.unwrap(), FlowStep::Question(0));
    complete_quiz(&wizard).await;
    assert_eq!(wizard.current_step().await, FlowStep::BlurredResults);

    let envelope = wizard.load_quiz_matches().await.unwrap();
    assert_eq!(envelope.origin, OriginSource::Quiz);
    assert_eq!(envelope.total_matches, 3);
    assert!(envelope.quiz_answers.is_some());

    // Gate closed: teasers only, no explanation leaks
    assert!(!wizard.lead_captured().await);
    match wizard.visible_results().await {
        ResultsView::Blurred(teasers) => {
            assert_eq!(teasers.len(), 3);
            assert_eq!(teasers[0].match_percentage, 92);
        }
        other => panic!("expected blurred view, got {other:?}"),
    }

    assert_eq!(
        wizard.request_reveal().await.unwrap(),
        FlowStep::LeadCapture
    );
    assert!(!wizard.lead_captured().await, "reveal alone must not open the gate");

    wizard.set_draft(draft()).await;
    let record = wizard.submit_lead().await.unwrap();
    assert_eq!(record.origin, OriginSource::Quiz);
    assert!(record.receipt_id.is_some());
    assert_eq!(wizard.current_step().await, FlowStep::FinalResults);
    assert!(wizard.lead_captured().await);

    match wizard.visible_results().await {
        ResultsView::Full(full) => {
            assert_eq!(full.explanation, "These fit your budget and seating needs.");
        }
        other => panic!("expected full view, got {other:?}"),
    }

    // Submitted payload carried the top two matches and the answers snapshot
    let payload = backend.last_lead.lock().await.clone().unwrap();
    assert_eq!(payload.selected_cars.len(), 2);
    assert_eq!(payload.selected_cars[0].name, "RAV4 Hybrid");
    assert!(payload.quiz_answers.is_some());
    assert_eq!(payload.broker_name, "Direct");
    assert_eq!(payload.origin, "quiz");
}

#[tokio::test]
async fn direct_flow_end_to_end() {
    let backend = Arc::new(MockBackend::new());
    let wizard = wizard_with(backend.clone());

    wizard.choose_path(PathChoice::DirectSearch).await.unwrap();
    assert_eq!(wizard.begin(None).await.unwrap(), FlowStep::DirectSearchInput);

    wizard.select_make("Ford").await;
    assert_eq!(wizard.load_models().await.unwrap(), vec!["Ranger"]);
    wizard.select_model("Ranger").await;

    assert_eq!(
        wizard.submit_search().await.unwrap(),
        FlowStep::BlurredResults
    );
    wizard.request_reveal().await.unwrap();
    wizard.set_draft(draft()).await;
    wizard.submit_lead().await.unwrap();

    let payload = backend.last_lead.lock().await.clone().unwrap();
    assert!(payload.quiz_answers.is_none(), "direct leads carry null answers");
    assert_eq!(payload.origin, "direct");
    assert_eq!(payload.selected_cars.len(), 2);
    assert_eq!(payload.selected_cars[0].brand, "Ford");
}

#[tokio::test]
async fn incomplete_quiz_never_reaches_the_backend() {
    let backend = Arc::new(MockBackend::new());
    let wizard = wizard_with(backend.clone());
    wizard.begin(None).await.unwrap();
    for question in &quiz_questions()[..3] {
        wizard
            .select_answer(question.id, question.options[0].value)
            .await
            .unwrap();
    }
    let err = wizard.load_quiz_matches().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::IncompleteAnswers { answered: 3, .. })
    ));
    assert_eq!(backend.quiz_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn quiz_fetch_is_memoized_by_fingerprint() {
    let backend = Arc::new(MockBackend::new());
    let wizard = wizard_with(backend.clone());
    wizard.begin(None).await.unwrap();
    complete_quiz(&wizard).await;

    let first = wizard.load_quiz_matches().await.unwrap();
    let second = wizard.load_quiz_matches().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        backend.quiz_calls.load(Ordering::SeqCst),
        1,
        "unchanged answers must not re-issue the matching call"
    );

    // A changed answer changes the fingerprint and allows one more call
    let q1 = &quiz_questions()[0];
    wizard
        .select_answer(q1.id, q1.options[1].value)
        .await
        .unwrap();
    wizard.load_quiz_matches().await.unwrap();
    assert_eq!(backend.quiz_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn final_results_unreachable_until_capture_succeeds() {
    let backend = Arc::new(MockBackend::new());
    backend.fail_lead.store(true, Ordering::SeqCst);
    let wizard = wizard_with(backend.clone());
    wizard.begin(None).await.unwrap();
    complete_quiz(&wizard).await;
    wizard.load_quiz_matches().await.unwrap();
    wizard.request_reveal().await.unwrap();
    wizard.set_draft(draft()).await;

    let err = wizard.submit_lead().await.unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::Server { status: 500, .. })));
    assert_eq!(wizard.current_step().await, FlowStep::LeadCapture);
    assert!(!wizard.lead_captured().await);
    assert_eq!(wizard.draft().await, draft(), "failure preserves the draft");
    assert!(wizard.submitted_leads().await.is_empty());

    // Backend recovers; the same draft goes through
    backend.fail_lead.store(false, Ordering::SeqCst);
    wizard.submit_lead().await.unwrap();
    assert_eq!(wizard.current_step().await, FlowStep::FinalResults);
    assert!(wizard.lead_captured().await);
}

#[tokio::test]
async fn lead_submission_is_single_flight() {
    let backend = Arc::new(MockBackend::new());
    let wizard = Arc::new(wizard_with(backend.clone()));
    wizard.begin(None).await.unwrap();
    complete_quiz(&wizard).await;
    wizard.load_quiz_matches().await.unwrap();
    wizard.request_reveal().await.unwrap();
    wizard.set_draft(draft()).await;

    let gate = backend.hold_lead().await;
    let first = {
        let wizard = wizard.clone();
        tokio::spawn(async move { wizard.submit_lead().await })
    };
    gate.entered.notified().await;

    // Second trigger while the first is in flight: rejected locally
    let err = wizard.submit_lead().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Flow(FlowError::SubmissionInFlight {
            operation: "lead capture"
        })
    ));

    gate.release.notify_one();
    first.await.unwrap().unwrap();
    assert_eq!(backend.lead_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn double_reveal_never_duplicates_submission() {
    let backend = Arc::new(MockBackend::new());
    let wizard = wizard_with(backend.clone());
    wizard.begin(None).await.unwrap();
    complete_quiz(&wizard).await;
    wizard.load_quiz_matches().await.unwrap();

    wizard.request_reveal().await.unwrap();
    // The second reveal request has nothing to transition and submits nothing
    assert!(wizard.request_reveal().await.is_err());
    assert_eq!(wizard.current_step().await, FlowStep::LeadCapture);
    assert_eq!(backend.lead_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stale_model_fetch_is_discarded() {
    let backend = Arc::new(MockBackend::new());
    let wizard = Arc::new(wizard_with(backend.clone()));
    wizard.choose_path(PathChoice::DirectSearch).await.unwrap();
    wizard.begin(None).await.unwrap();

    wizard.select_make("Toyota").await;
    let gate = backend.hold_models("Toyota").await;
    let stale = {
        let wizard = wizard.clone();
        tokio::spawn(async move { wizard.load_models().await })
    };
    // Wait until the Toyota fetch has actually dispatched
    gate.entered.notified().await;

    // Customer changes their mind; the BMW fetch dispatches and lands first
    wizard.select_make("BMW").await;
    let models = wizard.load_models().await.unwrap();
    assert_eq!(models, vec!["3 Series", "X5"]);

    // Toyota's response finally arrives and must not overwrite anything
    gate.release.notify_one();
    stale.await.unwrap().unwrap();
    assert_eq!(
        wizard.available_models().await,
        vec!["3 Series", "X5"],
        "models must reflect the latest make only"
    );
}

#[tokio::test]
async fn retake_resets_everything_but_history() {
    let backend = Arc::new(MockBackend::new());
    let wizard = wizard_with(backend.clone());
    wizard.begin(None).await.unwrap();
    complete_quiz(&wizard).await;
    wizard.load_quiz_matches().await.unwrap();
    wizard.request_reveal().await.unwrap();
    wizard.set_draft(draft()).await;
    wizard.submit_lead().await.unwrap();
    assert_eq!(wizard.submitted_leads().await.len(), 1);

    assert_eq!(wizard.retake().await, FlowStep::Start);
    assert!(!wizard.lead_captured().await);
    assert_eq!(wizard.draft().await, LeadDraft::default());
    assert!(matches!(
        wizard.visible_results().await,
        ResultsView::Pending
    ));
    // History of submitted leads survives
    assert_eq!(wizard.submitted_leads().await.len(), 1);

    // A second pass starts clean and fetches fresh matches
    wizard.begin(None).await.unwrap();
    assert_eq!(wizard.current_step().await, FlowStep::Question(0));
    complete_quiz(&wizard).await;
    wizard.load_quiz_matches().await.unwrap();
    assert_eq!(backend.quiz_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn search_failure_leaves_form_editable() {
    struct FailingSearch(MockBackend);

    #[async_trait]
    impl MatchingBackend for FailingSearch {
        async fn fetch_makes(&self) -> Result<Vec<String>, ApiError> {
            self.0.fetch_makes().await
        }
        async fn fetch_models(&self, make: &str) -> Result<Vec<String>, ApiError> {
            self.0.fetch_models(make).await
        }
        async fn search_cars(
            &self,
            _: &CarSearchRequest,
        ) -> Result<RawSearchPayload, ApiError> {
            Err(ApiError::Timeout {
                timeout: std::time::Duration::from_secs(30),
            })
        }
        async fn submit_quiz(
            &self,
            submission: &QuizSubmission,
        ) -> Result<RawQuizPayload, ApiError> {
            self.0.submit_quiz(submission).await
        }
        async fn capture_lead(
            &self,
            lead: &LeadCapturePayload,
        ) -> Result<LeadReceipt, ApiError> {
            self.0.capture_lead(lead).await
        }
    }

    let wizard = Wizard::new(
        Arc::new(FailingSearch(MockBackend::new())),
        Arc::new(MemoryStore::new()),
        FlowConfig::default(),
    );
    wizard.choose_path(PathChoice::DirectSearch).await.unwrap();
    wizard.begin(None).await.unwrap();
    wizard.select_make("Ford").await;
    wizard.select_model("Ranger").await;

    let err = wizard.submit_search().await.unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::Timeout { .. })));
    assert_eq!(wizard.current_step().await, FlowStep::DirectSearchInput);
    // The query survives for a retry
    assert!(matches!(
        wizard.visible_results().await,
        ResultsView::Pending
    ));
}
