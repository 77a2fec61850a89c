use model_gateway_rs::model::llm::ChatMessage;

use crate::{
    agent::context::ExecutionContext,
    prompt::builder::{build_page_prompt, build_step_prompt},
};

const ACTION_VOCABULARY: &str = r#"
Available actions (the "action" field selects one):
- navigate: {"action": "navigate", "url": "https://..."}
- click: {"action": "click", "target": "<CSS selector or element label>"}
- type_text: {"action": "type_text", "target": "<CSS selector or element label>", "text": "..."}
- press_key: {"action": "press_key", "key": "Enter"}
- extract: {"action": "extract", "target": "<CSS selector>", "label": "short name for the data"}
- wait: {"action": "wait", "ms": 1000}
- done: {"action": "done", "summary": "what was accomplished"}

Prefer targets taken from the identified UI elements when they are listed;
fall back to CSS selectors derived from the DOM excerpt otherwise.
"#;

/// Messages for the actor (and browser-nav) role: propose exactly one
/// concrete action for the current step.
pub fn generate_actor_message(ctx: &ExecutionContext) -> Vec<ChatMessage> {
    let system = format!(
        r#"
You are a browser automation agent.
Your only output should be valid JSON matching this structure.

Given the current step of a plan and the observed page state, propose exactly
ONE browser action that makes progress on the step.
{ACTION_VOCABULARY}
Output JSON structure:
{{
  "action": {{ ... one action object as above ... }},
  "rationale": "string"
}}

Never include any notes, explanations, or natural language outside the JSON.
"#
    );

    vec![
        ChatMessage::system(system.as_str()),
        generate_observation_message(ctx),
    ]
}

/// Messages for the single-agent (base) mode: the same action contract, but
/// the agent is also responsible for checking its own previous progress
/// before proposing the next action.
pub fn generate_base_message(ctx: &ExecutionContext) -> Vec<ChatMessage> {
    let system = format!(
        r#"
You are a browser automation agent working without a separate critic.
Your only output should be valid JSON matching this structure.

Given the current step of a plan and the observed page state, first check
whether your previous action achieved what the step needed, then propose
exactly ONE browser action. Emit {{"action": {{"action": "done", "summary": "..."}}}}
once the step's intent is satisfied.
{ACTION_VOCABULARY}
Output JSON structure:
{{
  "action": {{ ... one action object as above ... }},
  "rationale": "string"
}}

Never include any notes, explanations, or natural language outside the JSON.
"#
    );

    vec![
        ChatMessage::system(system.as_str()),
        generate_observation_message(ctx),
    ]
}

fn generate_observation_message(ctx: &ExecutionContext) -> ChatMessage {
    let mut sections = Vec::new();

    sections.push(format!("Task: {}", ctx.command.instruction));

    if let Some(step) = &ctx.step {
        sections.push(build_step_prompt(step));
    }

    if let Some(snapshot) = &ctx.snapshot {
        sections.push(build_page_prompt(snapshot));
    } else {
        sections.push("No page observation is available yet.".to_string());
    }

    if let Some(guidance) = &ctx.guidance {
        sections.push(format!(
            "The previous attempt at this step was rejected. Corrective guidance: {guidance}"
        ));
    }

    let content = sections.join("\n\n");
    ChatMessage::user(content.as_str())
}
