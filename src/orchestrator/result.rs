use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::types::{State, StepStatus};

/// Per-step audit record. One record per step per plan; a re-planned run
/// keeps the failed records of the abandoned plan alongside the new ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub plan_id: String,
    pub step_id: usize,
    pub description: String,
    pub attempts: u32,
    pub status: StepStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_action: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Terminal artifact of one command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: String,
    pub success: bool,
    pub final_state: State,
    pub steps: Vec<StepRecord>,
    pub replans: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
