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
        core::{AgentResponse, AgentRole, VerdictResponse},
        types::State,
    },
    agents::gateway::{self, DEFAULT_CONTRACT_RETRY},
    error::Result,
    message::critic::generate_critic_message,
};

/// Judges whether the most recent action's outcome satisfies the current
/// step's intent.
pub struct CriticAgent<T>
where
    T: ModelSDK<Input = LlmInput, Output = LlmOutput> + Sync + Send,
{
    llm_client: LlmClient<T>,
    contract_retry: usize,
}

impl<T> CriticAgent<T>
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
impl<T> AgentRole for CriticAgent<T>
where
    T: ModelSDK<Input = LlmInput, Output = LlmOutput> + Sync + Send,
{
    fn name(&self) -> &str {
        "critic"
    }

    fn state(&self) -> State {
        State::AgentQCritic
    }

    async fn handle(&self, ctx: &ExecutionContext) -> Result<AgentResponse> {
        let response: VerdictResponse = gateway::call_role(
            &self.llm_client,
            self.name(),
            self.contract_retry,
            || generate_critic_message(ctx),
        )
        .await?;
        debug!(
            "critic verdict: accepted={} reason={:?}",
            response.accepted, response.reason
        );
        Ok(AgentResponse::Verdict(response))
    }
}

impl Default for CriticAgent<OpenAiSdk> {
    fn default() -> Self {
        Self::new(LlmClient::new(
            OpenAiSdk::new("", "http://localhost:11434/v1", "llama3.2").unwrap(),
        ))
    }
}
