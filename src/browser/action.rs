use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{browser::session::BrowserSession, error::Result};

/// A single concrete browser operation proposed by an agent for the current
/// step. This is the only vocabulary agents may use to touch the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BrowserAction {
    Navigate { url: String },
    Click { target: String },
    TypeText { target: String, text: String },
    PressKey { key: String },
    Extract { target: String, label: String },
    Wait { ms: u64 },
    Done { summary: String },
}

/// Text extracted from the page by an `Extract` action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub label: String,
    pub content: String,
}

impl BrowserAction {
    /// Run this action against the session. Extraction output is returned to
    /// the caller; everything else is a side effect on the page.
    pub async fn execute(&self, session: &mut dyn BrowserSession) -> Result<Option<Extraction>> {
        match self {
            BrowserAction::Navigate { url } => {
                session.navigate(url).await?;
                Ok(None)
            }
            BrowserAction::Click { target } => {
                session.click(target).await?;
                Ok(None)
            }
            BrowserAction::TypeText { target, text } => {
                session.type_text(target, text).await?;
                Ok(None)
            }
            BrowserAction::PressKey { key } => {
                session.press_key(key).await?;
                Ok(None)
            }
            BrowserAction::Extract { target, label } => {
                let content = session.extract_text(target).await?;
                Ok(Some(Extraction {
                    label: label.clone(),
                    content,
                }))
            }
            BrowserAction::Wait { ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(*ms)).await;
                Ok(None)
            }
            // Done carries no page effect; the orchestrator reads the summary.
            BrowserAction::Done { .. } => Ok(None),
        }
    }
}

// Display is used for step history records and log lines.
impl fmt::Display for BrowserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserAction::Navigate { url } => write!(f, "navigate to {url}"),
            BrowserAction::Click { target } => write!(f, "click '{target}'"),
            BrowserAction::TypeText { target, text } => {
                write!(f, "type \"{text}\" into '{target}'")
            }
            BrowserAction::PressKey { key } => write!(f, "press key '{key}'"),
            BrowserAction::Extract { target, label } => {
                write!(f, "extract '{target}' as {label}")
            }
            BrowserAction::Wait { ms } => write!(f, "wait {ms}ms"),
            BrowserAction::Done { summary } => write!(f, "done: {summary}"),
        }
    }
}
