use async_trait::async_trait;
use model_gateway_rs::{
    clients::llm::LlmClient,
    model::llm::{LlmInput, LlmOutput},
    sdk::{ModelSDK, openai::OpenAiSdk},
};

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

/// Page-level navigation agent serving the Browse state. Shares the actor's
/// action contract; used for proposals when no dedicated actor role is
/// registered.
pub struct BrowserNavAgent<T>
where
    T: ModelSDK<Input = LlmInput, Output = LlmOutput> + Sync + Send,
{
    llm_client: LlmClient<T>,
    contract_retry: usize,
}

impl<T> BrowserNavAgent<T>
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
impl<T> AgentRole for BrowserNavAgent<T>
where
    T: ModelSDK<Input = LlmInput, Output = LlmOutput> + Sync + Send,
{
    fn name(&self) -> &str {
        "browser_nav"
    }

    fn state(&self) -> State {
        State::Browse
    }

    async fn handle(&self, ctx: &ExecutionContext) -> Result<AgentResponse> {
        let response: ActionResponse = gateway::call_role(
            &self.llm_client,
            self.name(),
            self.contract_retry,
            || generate_actor_message(ctx),
        )
        .await?;
        Ok(AgentResponse::Action(response))
    }
}

impl Default for BrowserNavAgent<OpenAiSdk> {
    fn default() -> Self {
        Self::new(LlmClient::new(
            OpenAiSdk::new("", "http://localhost:11434/v1", "llama3.2").unwrap(),
        ))
    }
}
