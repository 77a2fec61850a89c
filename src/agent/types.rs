use std::fmt;

use serde::{Deserialize, Serialize};

/// Which agent role is currently active. Exactly one state is current at any
/// time during a run; transitions are owned by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    Plan,
    Browse,
    AgentQBase,
    AgentQActor,
    AgentQCritic,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Plan => write!(f, "plan"),
            State::Browse => write!(f, "browse"),
            State::AgentQBase => write!(f, "agentq_base"),
            State::AgentQActor => write!(f, "agentq_actor"),
            State::AgentQCritic => write!(f, "agentq_critic"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Pending,
    Executing,
    Done,
    Failed,
}

impl Default for StepStatus {
    fn default() -> Self {
        StepStatus::Pending
    }
}

/// Strategy choice for the decision loop: the full actor/critic split, or a
/// single agent that proposes and self-validates (eval-style runs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentMode {
    ActorCritic,
    SingleAgent,
}

impl Default for AgentMode {
    fn default() -> Self {
        AgentMode::ActorCritic
    }
}
