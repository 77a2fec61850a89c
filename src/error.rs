use std::{io, time::Duration};

use thiserror::Error as ThisError;

use crate::agent::types::State;

#[derive(ThisError, Debug)]
pub enum Error {
    /// The browser session could not be acquired. Fatal before any state is
    /// entered.
    #[error("session init failed: {0}")]
    SessionInit(String),

    /// The planner returned no actionable step. Fatal with zero retries.
    #[error("planning failed: {0}")]
    PlanningFailed(String),

    /// An agent kept returning responses that do not match its schema.
    #[error("agent '{role}' violated its response contract: {reason}")]
    ContractViolation { role: String, reason: String },

    /// Step retry and replan budgets are both spent.
    #[error("execution exhausted: {0}")]
    ExecutionExhausted(String),

    #[error("no agent registered for state {0}")]
    MissingAgent(State),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("vision grounding error: {0}")]
    Vision(String),

    #[error("{0} timed out after {1:?}")]
    Timeout(&'static str, Duration),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serde_json error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("model error: {0}")]
    ModelError(#[from] model_gateway_rs::error::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
