pub mod actor_agent;
pub mod agentq_agent;
pub mod browser_nav_agent;
pub mod critic_agent;
pub mod planner_agent;

pub use actor_agent::ActorAgent;
pub use agentq_agent::AgentQAgent;
pub use browser_nav_agent::BrowserNavAgent;
pub use critic_agent::CriticAgent;
pub use planner_agent::PlannerAgent;

pub(crate) mod gateway {
    use model_gateway_rs::{
        clients::llm::LlmClient,
        model::llm::{ChatMessage, LlmInput, LlmOutput},
        sdk::ModelSDK,
        traits::ModelClient,
    };
    use serde::de::DeserializeOwned;
    use tracing::warn;

    use crate::{
        agent::core::parse_response,
        error::{Error, Result},
    };

    /// How many times a role re-asks the model after a malformed structured
    /// response before escalating a contract violation.
    pub const DEFAULT_CONTRACT_RETRY: usize = 2;

    pub async fn complete<T>(
        client: &LlmClient<T>,
        role: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<String>
    where
        T: ModelSDK<Input = LlmInput, Output = LlmOutput> + Sync + Send,
    {
        let input = LlmInput {
            messages,
            max_tokens: Some(4096),
        };
        let output: LlmOutput = client.infer(input).await?;
        match output.get_message() {
            Some(message) => Ok(message.content.to_string()),
            None => Err(Error::ContractViolation {
                role: role.to_string(),
                reason: "model returned no message".to_string(),
            }),
        }
    }

    /// Call the model and parse its reply into the role's typed response.
    /// Malformed replies are retried with freshly built messages; the last
    /// failure escalates as a contract violation.
    pub async fn call_role<T, R>(
        client: &LlmClient<T>,
        role: &str,
        contract_retry: usize,
        build_messages: impl Fn() -> Vec<ChatMessage> + Send + Sync,
    ) -> Result<R>
    where
        T: ModelSDK<Input = LlmInput, Output = LlmOutput> + Sync + Send,
        R: DeserializeOwned,
    {
        for attempt in 1..=contract_retry {
            let raw = complete(client, role, build_messages()).await?;
            match parse_response::<R>(role, &raw) {
                Ok(parsed) => return Ok(parsed),
                Err(e) => {
                    warn!("{role} returned a malformed response (attempt {attempt}): {e}");
                }
            }
        }
        let raw = complete(client, role, build_messages()).await?;
        parse_response(role, &raw)
    }
}
