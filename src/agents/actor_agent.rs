use async_trait::async_trait;
use model_gateway_rs::{
    clients::llm::LlmClient,
    model::llm::{LlmInput, LlmOutput},
    sdk::{ModelSDK, openai::OpenAiSdk},
};
use tracing::debug;

use crate::{
    agent::{
        context::ExecutionContext,
        core::{ActionResponse, AgentResponse, AgentRole},
        types::State,
    },
    agents::gateway::{self, DEFAULT_CONTRACT_RETRY},
    error::Result,
    message::actor::generate_actor_message,
};

/// Proposes one concrete browser action for the current step in the full
/// actor/critic loop.
pub struct ActorAgent<T>
where
    T: ModelSDK<Input = LlmInput, Output = LlmOutput> + Sync + Send,
{
    llm_client: LlmClient<T>,
    contract_retry: usize,
}

impl<T> ActorAgent<T>
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
impl<T> AgentRole for ActorAgent<T>
where
    T: ModelSDK<Input = LlmInput, Output = LlmOutput> + Sync + Send,
{
    fn name(&self) -> &str {
        "actor"
    }

    fn state(&self) -> State {
        State::AgentQActor
    }

    async fn handle(&self, ctx: &ExecutionContext) -> Result<AgentResponse> {
        let degraded = ctx
            .snapshot
            .as_ref()
            .map(|s| s.is_degraded())
            .unwrap_or(true);
        debug!("actor proposing action (vision degraded: {degraded})");

        let response: ActionResponse = gateway::call_role(
            &self.llm_client,
            self.name(),
            self.contract_retry,
            || generate_actor_message(ctx),
        )
        .await?;
        debug!("actor proposed: {}", response.action);
        Ok(AgentResponse::Action(response))
    }
}

impl Default for ActorAgent<OpenAiSdk> {
    fn default() -> Self {
        Self::new(LlmClient::new(
            OpenAiSdk::new("", "http://localhost:11434/v1", "llama3.2").unwrap(),
        ))
    }
}
