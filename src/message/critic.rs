use model_gateway_rs::model::llm::ChatMessage;

use crate::{
    agent::context::ExecutionContext,
    prompt::builder::{build_page_prompt, build_step_prompt},
};

pub fn generate_critic_message(ctx: &ExecutionContext) -> Vec<ChatMessage> {
    vec![generate_system_message(), generate_user_message(ctx)]
}

fn generate_system_message() -> ChatMessage {
    let content = r#"
You are a critic validating browser automation steps.
Your only output should be valid JSON matching this structure.

You are given the intent of the current plan step, the action that was just
executed, and the page state observed AFTER the action. Decide whether the
action's outcome satisfies the step's intent.

Rules:
- Judge only the most recent action against the current step, nothing else.
- Reject when the page shows no evidence the step succeeded.
- When rejecting, give short corrective guidance the actor can apply on retry.

Output JSON structure:
{
  "accepted": true,
  "reason": "string",
  "guidance": "string or omitted"
}

Never include any notes, explanations, or natural language outside the JSON.
"#;
    ChatMessage::system(content)
}

fn generate_user_message(ctx: &ExecutionContext) -> ChatMessage {
    let mut sections = Vec::new();

    sections.push(format!("Task: {}", ctx.command.instruction));

    if let Some(step) = &ctx.step {
        sections.push(build_step_prompt(step));
    }

    if let Some(action) = &ctx.last_action {
        sections.push(format!("Executed action: {action}"));
    }

    if let Some(snapshot) = &ctx.snapshot {
        sections.push(format!("Post-action observation:\n{}", build_page_prompt(snapshot)));
    }

    let content = sections.join("\n\n");
    ChatMessage::user(content.as_str())
}
