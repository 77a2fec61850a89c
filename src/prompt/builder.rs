use crate::{
    agent::planning::PlanStep,
    browser::ScreenshotSnapshot,
    input::Command,
    utils::truncate_chars,
    vision::UiElement,
};

const DOM_EXCERPT_MAX_CHARS: usize = 4000;

pub fn build_command_prompt(command: &Command, failure_notes: &[String]) -> String {
    let notes = command.notes.as_deref().unwrap_or("None");
    let failures = if failure_notes.is_empty() {
        "None".to_string()
    } else {
        failure_notes
            .iter()
            .map(|note| format!("- {note}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"
Please decompose the following browsing task into an ordered plan.

Task: {}
Operator Notes: {}
Previous Failures: {}
"#,
        command.instruction, notes, failures
    )
}

pub fn build_step_prompt(step: &PlanStep) -> String {
    format!("Current step {}: {}", step.step_id, step.description)
}

pub fn build_elements_prompt(elements: &[UiElement]) -> String {
    if elements.is_empty() {
        return "No vision-grounded elements are available. \
Rely on the DOM excerpt below and use CSS selectors."
            .to_string();
    }

    let list = elements
        .iter()
        .map(|el| {
            let role = el.role.as_deref().unwrap_or("unknown");
            match &el.region {
                Some(r) => format!(
                    " - label: {} | role: {} | region: ({}, {}) {}x{}",
                    el.label, role, r.x, r.y, r.width, r.height
                ),
                None => format!(" - label: {} | role: {}", el.label, role),
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("Identified UI elements:\n{list}")
}

pub fn build_page_prompt(snapshot: &ScreenshotSnapshot) -> String {
    format!(
        r#"Page URL: {}
Page Title: {}
{}
DOM excerpt:
{}"#,
        snapshot.url,
        snapshot.title,
        build_elements_prompt(&snapshot.elements),
        truncate_chars(&snapshot.dom_excerpt, DOM_EXCERPT_MAX_CHARS)
    )
}
