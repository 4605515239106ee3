//! Flow state machine — explicit step × event transition table.
//!
//! The table is independent of any UI callback mechanism; the wizard feeds
//! it events and the table answers with the next step or a `FlowError`.

use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// Where the customer is in the flow.
///
/// ```text
/// Start -> Question(0) | DirectSearchInput
/// Question(i) -> Question(i+1) [answered]  |  Start [retreat @ i=0]
/// Question(N-1) -> BlurredResults [advance]
/// DirectSearchInput -> BlurredResults [search success]
/// BlurredResults -> LeadCapture [request reveal]
/// LeadCapture -> FinalResults [submit success] | LeadCapture [submit failure]
/// FinalResults -> Start [retake]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    Start,
    Question(usize),
    DirectSearchInput,
    BlurredResults,
    LeadCapture,
    FinalResults,
}

impl FlowStep {
    /// Terminal until retake.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FinalResults)
    }
}

impl Default for FlowStep {
    fn default() -> Self {
        Self::Start
    }
}

impl std::fmt::Display for FlowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Question(i) => write!(f, "question({i})"),
            Self::DirectSearchInput => write!(f, "direct_search_input"),
            Self::BlurredResults => write!(f, "blurred_results"),
            Self::LeadCapture => write!(f, "lead_capture"),
            Self::FinalResults => write!(f, "final_results"),
        }
    }
}

/// Events the wizard feeds into the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEvent {
    BeginQuiz,
    BeginDirectSearch,
    /// Move past the current (answered) question.
    Advance,
    /// Step backwards one question, or back out of the lead form.
    Retreat,
    SearchSucceeded,
    RequestReveal,
    LeadSubmitted,
    LeadFailed,
    Retake,
}

impl std::fmt::Display for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::BeginQuiz => "begin_quiz",
            Self::BeginDirectSearch => "begin_direct_search",
            Self::Advance => "advance",
            Self::Retreat => "retreat",
            Self::SearchSucceeded => "search_succeeded",
            Self::RequestReveal => "request_reveal",
            Self::LeadSubmitted => "lead_submitted",
            Self::LeadFailed => "lead_failed",
            Self::Retake => "retake",
        };
        write!(f, "{s}")
    }
}

/// Resolve one transition. `question_count` bounds the quiz; `Retake` is a
/// global reset and is accepted from every step.
pub fn transition(
    step: FlowStep,
    event: FlowEvent,
    question_count: usize,
) -> Result<FlowStep, FlowError> {
    use FlowEvent::*;
    use FlowStep::*;

    let next = match (step, event) {
        (_, Retake) => Start,

        (Start, BeginQuiz) => Question(0),
        (Start, BeginDirectSearch) => DirectSearchInput,

        (Question(i), Advance) if i + 1 < question_count => Question(i + 1),
        (Question(i), Advance) if i + 1 == question_count => BlurredResults,
        (Question(0), Retreat) => Start,
        (Question(i), Retreat) => Question(i - 1),

        (DirectSearchInput, SearchSucceeded) => BlurredResults,
        (DirectSearchInput, Retreat) => Start,

        (BlurredResults, RequestReveal) => LeadCapture,

        (LeadCapture, LeadSubmitted) => FinalResults,
        (LeadCapture, LeadFailed) => LeadCapture,
        (LeadCapture, Retreat) => BlurredResults,

        (step, event) => {
            return Err(FlowError::InvalidTransition {
                step: step.to_string(),
                event: event.to_string(),
            });
        }
    };
    Ok(next)
}
