use async_trait::async_trait;
use model_gateway_rs::{
    clients::llm::LlmClient,
    model::llm::{LlmInput, LlmOutput},
    sdk::{ModelSDK, openai::OpenAiSdk},
};
use tracing::info;

use crate::{
    agent::{
        context::ExecutionContext,
        core::{AgentResponse, AgentRole, PlanResponse},
        types::State,
    },
    agents::gateway::{self, DEFAULT_CONTRACT_RETRY},
    error::Result,
    message::planner::generate_planner_message,
};

/// Decomposes the command into an ordered plan of semantic steps.
pub struct PlannerAgent<T>
where
    T: ModelSDK<Input = LlmInput, Output = LlmOutput> + Sync + Send,
{
    llm_client: LlmClient<T>,
    contract_retry: usize,
}

impl<T> PlannerAgent<T>
where
    T: ModelSDK<Input = LlmInput, Output = LlmOutput> + Sync + Send,
{
    pub fn new(llm_client: LlmClient<T>) -> Self {
        Self {
            llm_client,
            contract_retry: DEFAULT_CONTRACT_RETRY,
        }
    }

    pub fn with_contract_retry(mut self, contract_retry: usize) -> Self {
        self.contract_retry = contract_retry;
        self
    }
}

#[async_trait]
impl<T> AgentRole for PlannerAgent<T>
where
    T: ModelSDK<Input = LlmInput, Output = LlmOutput> + Sync + Send,
{
    fn name(&self) -> &str {
        "planner"
    }

    fn state(&self) -> State {
        State::Plan
    }

    async fn handle(&self, ctx: &ExecutionContext) -> Result<AgentResponse> {
        info!("planner decomposing command: {}", ctx.command.instruction);
        let response: PlanResponse = gateway::call_role(
            &self.llm_client,
            self.name(),
            self.contract_retry,
            || generate_planner_message(ctx),
        )
        .await?;
        info!("planner produced {} step(s)", response.steps.len());
        Ok(AgentResponse::Plan(response))
    }
}

impl Default for PlannerAgent<OpenAiSdk> {
    fn default() -> Self {
        Self::new(LlmClient::new(
            OpenAiSdk::new("", "http://localhost:11434/v1", "llama3.2").unwrap(),
        ))
    }
}
