mod response;
mod role;

pub use response::{
    ActionResponse, AgentResponse, PlanResponse, PlannedStep, VerdictResponse, parse_response,
};
pub use role::AgentRole;
