use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::{
    agent::planning::{PlanStep, TaskPlan},
    browser::BrowserAction,
    error::{Error, Result},
    utils::StripCodeBlock,
};

/// Plan produced by the planner role: ordered semantic steps, no actions yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<PlannedStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedStep {
    pub step_id: usize,
    pub description: String,
}

impl PlanResponse {
    pub fn into_plan(self) -> TaskPlan {
        let steps = self
            .steps
            .into_iter()
            .map(|s| PlanStep::new(s.step_id, s.description))
            .collect();
        TaskPlan::new(steps, self.description)
    }
}

/// One concrete browser action proposed for the current step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub action: BrowserAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// The critic's judgment of the most recent action's outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictResponse {
    pub accepted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Corrective guidance handed to the actor on retry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

impl VerdictResponse {
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            reason: None,
            guidance: None,
        }
    }

    pub fn rejected(reason: impl Into<String>, guidance: Option<String>) -> Self {
        Self {
            accepted: false,
            reason: Some(reason.into()),
            guidance,
        }
    }
}

/// Every role returns exactly one of these; the orchestrator refuses any
/// variant that does not match the active state's contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentResponse {
    Plan(PlanResponse),
    Action(ActionResponse),
    Verdict(VerdictResponse),
}

impl AgentResponse {
    pub fn expect_plan(self, role: &str) -> Result<PlanResponse> {
        match self {
            AgentResponse::Plan(plan) => Ok(plan),
            other => Err(contract_violation(role, &other, "plan")),
        }
    }

    pub fn expect_action(self, role: &str) -> Result<ActionResponse> {
        match self {
            AgentResponse::Action(action) => Ok(action),
            other => Err(contract_violation(role, &other, "action")),
        }
    }

    pub fn expect_verdict(self, role: &str) -> Result<VerdictResponse> {
        match self {
            AgentResponse::Verdict(verdict) => Ok(verdict),
            other => Err(contract_violation(role, &other, "verdict")),
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            AgentResponse::Plan(_) => "plan",
            AgentResponse::Action(_) => "action",
            AgentResponse::Verdict(_) => "verdict",
        }
    }
}

fn contract_violation(role: &str, got: &AgentResponse, wanted: &'static str) -> Error {
    Error::ContractViolation {
        role: role.to_string(),
        reason: format!("expected a {wanted} response, got {}", got.variant_name()),
    }
}

/// Parse raw model output (possibly fenced in a code block) into a typed
/// response. A parse failure is a contract violation attributed to `role`.
pub fn parse_response<T: DeserializeOwned>(role: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw.strip_code_block()).map_err(|e| Error::ContractViolation {
        role: role.to_string(),
        reason: format!("malformed structured response: {e}"),
    })
}
