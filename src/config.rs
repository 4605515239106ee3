//! Configuration types.

use std::time::Duration;

/// Wizard configuration.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Bounded timeout applied to every backend call.
    pub request_timeout: Duration,
    /// How many matches are attached to a lead submission.
    pub results_to_show: usize,
    /// Maximum customer name length.
    pub max_name_length: usize,
    /// Maximum free-text comment length.
    pub max_comment_length: usize,
    /// Partner attribution used when no broker tag was supplied.
    pub default_broker: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            results_to_show: 2,
            max_name_length: 50,
            max_comment_length: 500,
            default_broker: "Direct".to_string(),
        }
    }
}
