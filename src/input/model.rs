use serde::{Deserialize, Serialize};

/// The user's natural-language instruction for a single run.
///
/// Upstream glue (prompt enhancement, speech transcription) may rewrite the
/// raw text before it gets here; once accepted by the orchestrator the
/// command is immutable for the rest of the run.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Command {
    /// What the user wants done, e.g. "search for eggs".
    pub instruction: String,

    /// Optional operator notes or constraints, e.g. "stay on the current
    /// site". Appended to the planner prompt when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Command {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl From<&str> for Command {
    fn from(instruction: &str) -> Self {
        Self::new(instruction)
    }
}
