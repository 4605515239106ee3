//! Car discovery wizard — flow controller core.
//!
//! Two entry paths (guided quiz, direct make/model search), one unified
//! result contract, and a reveal gate that withholds full match detail
//! until a lead is captured. Rendering, routing, and storage internals
//! are the host's problem; this crate owns the state machine, the
//! normalization, and the submission discipline.

pub mod backend;
pub mod config;
pub mod error;
pub mod flow;
pub mod lead;
pub mod normalize;
pub mod questions;
pub mod results;
pub mod store;

pub use backend::{HttpMatchingBackend, MatchingBackend};
pub use config::FlowConfig;
pub use error::{ApiError, Error, FlowError, NormalizationError, Result, ValidationError};
pub use flow::{BackAction, FlowEvent, FlowStep, NavIntent, PathChoice, Wizard};
pub use lead::{BrokerInfo, ContactMethod, LeadDraft, LeadRecord};
pub use results::{CarMatch, MatchTeaser, OriginSource, ResultEnvelope, ResultsView, SearchQuery};
pub use store::{KeyValueStore, MemoryStore};
