use crate::{
    agent::planning::{PlanStep, TaskPlan},
    browser::{BrowserAction, ScreenshotSnapshot},
    input::Command,
};

/// Everything an agent invocation may consider, assembled fresh by the
/// orchestrator per call. Which fields are populated depends on the role:
/// the planner sees command + failure notes, the actor additionally sees the
/// current step and snapshot, the critic sees the executed action and the
/// post-action snapshot.
#[derive(Debug, Default, Clone)]
pub struct ExecutionContext {
    pub command: Command,

    /// Current plan, if one exists yet.
    pub plan: Option<TaskPlan>,

    /// The step being worked on.
    pub step: Option<PlanStep>,

    /// Latest page snapshot. `None` before the first capture.
    pub snapshot: Option<ScreenshotSnapshot>,

    /// The action whose outcome the critic is judging.
    pub last_action: Option<BrowserAction>,

    /// Corrective guidance from the previous rejection, for retries.
    pub guidance: Option<String>,

    /// Accumulated failure summaries, appended to the planner prompt on
    /// re-planning.
    pub failure_notes: Vec<String>,
}

impl ExecutionContext {
    pub fn for_planning(command: &Command, failure_notes: &[String]) -> Self {
        Self {
            command: command.clone(),
            failure_notes: failure_notes.to_vec(),
            ..Self::default()
        }
    }
}
