pub mod context;
pub mod core;
pub mod planning;
pub mod types;

pub use context::ExecutionContext;
pub use core::{
    ActionResponse, AgentResponse, AgentRole, PlanResponse, PlannedStep, VerdictResponse,
    parse_response,
};
pub use planning::{PlanStep, TaskPlan};
pub use types::{AgentMode, State, StepStatus};
