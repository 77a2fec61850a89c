use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Narrow interface over a controllable page/tab. Every method is fallible
/// I/O; the orchestrator maps failures to step-level rejections, never to
/// crashes.
///
/// A session is exclusively owned by one run: acquired once, released exactly
/// once via `close`, regardless of how the run ends.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn current_url(&self) -> Result<String>;

    async fn page_title(&self) -> Result<String>;

    /// A trimmed textual rendering of the DOM, used as degraded context when
    /// vision grounding is unavailable.
    async fn dom_summary(&self) -> Result<String>;

    async fn navigate(&mut self, url: &str) -> Result<()>;

    async fn click(&mut self, target: &str) -> Result<()>;

    async fn type_text(&mut self, target: &str, text: &str) -> Result<()>;

    async fn press_key(&mut self, key: &str) -> Result<()>;

    async fn extract_text(&mut self, target: &str) -> Result<String>;

    /// Wait until the page reaches a stable load state. A timeout here is an
    /// attempt-level rejection by construction, not an error the run dies on.
    async fn wait_for_load_state(&mut self) -> Result<()>;

    async fn screenshot(&mut self, full_page: bool) -> Result<Vec<u8>>;

    fn viewport_size(&self) -> Viewport;

    async fn close(&mut self) -> Result<()>;
}

/// Hands out browser sessions. One acquisition per run.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn BrowserSession>>;
}
