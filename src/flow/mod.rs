//! The wizard flow — entry path selection, quiz and direct-search engines,
//! reveal gate, and lead submission, driven through an explicit state
//! machine.

pub mod answers;
pub mod state;
pub mod wizard;

pub use answers::AnswerSet;
pub use state::{transition, FlowEvent, FlowStep};
pub use wizard::{BackAction, NavIntent, PathChoice, Wizard};
