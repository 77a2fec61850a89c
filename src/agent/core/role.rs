use async_trait::async_trait;

use crate::{
    agent::{context::ExecutionContext, core::response::AgentResponse, types::State},
    error::Result,
};

/// A role-specific decision-making unit backed by a language-model call.
///
/// Roles are stateless across invocations: everything they may consider
/// arrives in the `ExecutionContext`, so the orchestrator can retry or
/// re-plan without stale agent memory leaking between attempts.
#[async_trait]
pub trait AgentRole: Send + Sync {
    fn name(&self) -> &str;

    /// The state this role serves when looked up in the registry.
    fn state(&self) -> State;

    async fn handle(&self, ctx: &ExecutionContext) -> Result<AgentResponse>;
}
