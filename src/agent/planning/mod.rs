mod step;

use serde::{Deserialize, Serialize};
pub use step::PlanStep;

use crate::agent::types::StepStatus;

/// An ordered sequence of steps for one command, produced by the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPlan {
    pub plan_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub steps: Vec<PlanStep>,
}

impl TaskPlan {
    pub fn new(steps: Vec<PlanStep>, description: Option<String>) -> Self {
        Self {
            plan_id: uuid::Uuid::new_v4().simple().to_string(),
            description,
            steps,
        }
    }

    /// The next step that has not been completed or abandoned.
    pub fn next_pending_step(&self) -> Option<&PlanStep> {
        self.steps
            .iter()
            .find(|step| matches!(step.status, StepStatus::Pending | StepStatus::Executing))
    }

    pub fn is_complete(&self) -> bool {
        self.steps
            .iter()
            .all(|step| matches!(step.status, StepStatus::Done))
    }

    pub fn mark_step(&mut self, step_id: usize, status: StepStatus, error_reason: Option<String>) {
        if let Some(step) = self.steps.iter_mut().find(|s| s.step_id == step_id) {
            step.status = status;
            if error_reason.is_some() {
                step.error_reason = error_reason;
            }
        }
    }
}
