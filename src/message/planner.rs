use model_gateway_rs::model::llm::ChatMessage;

use crate::{agent::context::ExecutionContext, prompt::builder::build_command_prompt};

pub fn generate_planner_message(ctx: &ExecutionContext) -> Vec<ChatMessage> {
    vec![generate_system_message(), generate_user_message(ctx)]
}

fn generate_system_message() -> ChatMessage {
    let content = r#"
You are a web task planning assistant.
Your only output should be valid JSON matching this structure.

Decompose the user's browsing task into a short ordered list of semantic
sub-goals. Each step describes WHAT to achieve on the page, not which element
to click; a separate agent turns steps into concrete browser actions later.

Rules:
- Keep steps small and verifiable (e.g. "open the search page", "enter the query", "submit the search").
- Number steps from 1, in execution order.
- If "Previous Failures" are listed, produce an alternative plan that avoids them while still achieving the goal.
- If the task is impossible or empty, output an empty "steps" array.

Output JSON structure:
{
  "description": "string",
  "steps": [
    {
      "step_id": 1,
      "description": "string"
    }
  ]
}

Never include any notes, explanations, or natural language.
Only output the JSON in the exact structure above.
"#;
    ChatMessage::system(content)
}

fn generate_user_message(ctx: &ExecutionContext) -> ChatMessage {
    let content = build_command_prompt(&ctx.command, &ctx.failure_notes);
    ChatMessage::user(content.as_str())
}
