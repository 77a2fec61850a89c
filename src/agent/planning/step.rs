use serde::{Deserialize, Serialize};

use crate::agent::types::StepStatus;

/// A semantic sub-goal produced by the planner, not yet a concrete browser
/// action. The orchestrator only ever touches `status` and `error_reason`;
/// step content is append-only guidance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    pub step_id: usize,

    pub description: String,

    #[serde(default)]
    pub status: StepStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

impl PlanStep {
    pub fn new(step_id: usize, description: impl Into<String>) -> Self {
        Self {
            step_id,
            description: description.into(),
            status: StepStatus::default(),
            error_reason: None,
        }
    }
}
