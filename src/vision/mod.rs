pub mod gpt;

use std::time::Duration;

use async_trait::async_trait;
pub use gpt::GptVision;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{browser::session::Viewport, error::Result};

/// Approximate location of an element inside the viewport, as reported by
/// the grounding model. Coordinates are in CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionHint {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A UI element identified on a screenshot, with a semantic label agents can
/// reference when proposing actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiElement {
    pub label: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionHint>,
}

/// Maps a screenshot to labeled UI elements.
///
/// Implementations must be idempotent and side-effect free: grounding the
/// same snapshot twice returns the same element set. How grounding is
/// computed is not part of this contract.
#[async_trait]
pub trait VisionGrounding: Send + Sync {
    async fn ground(&self, image: &[u8], viewport: Viewport) -> Result<Vec<UiElement>>;
}

/// Ground a screenshot, degrading to an empty element set on error or
/// timeout. Vision is advisory: a failure here must never abort the run, it
/// only removes visual context from the actor's next decision.
pub async fn ground_or_empty(
    service: &dyn VisionGrounding,
    image: &[u8],
    viewport: Viewport,
    timeout: Duration,
) -> Vec<UiElement> {
    match tokio::time::timeout(timeout, service.ground(image, viewport)).await {
        Ok(Ok(elements)) => elements,
        Ok(Err(e)) => {
            warn!("vision grounding failed, continuing with DOM-only context: {e}");
            Vec::new()
        }
        Err(_) => {
            warn!("vision grounding timed out after {timeout:?}, continuing with DOM-only context");
            Vec::new()
        }
    }
}
