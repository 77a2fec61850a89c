use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{browser::session::Viewport, vision::UiElement};

/// Everything known about the page at one decision point: raw screenshot
/// bytes, viewport metadata, vision-grounded elements, and a DOM excerpt for
/// the degraded (vision-less) path.
///
/// Never mutated, only superseded by the next capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotSnapshot {
    #[serde(skip)]
    pub image: Vec<u8>,
    pub viewport: Viewport,
    pub elements: Vec<UiElement>,
    pub url: String,
    pub title: String,
    pub dom_excerpt: String,
    pub captured_at: DateTime<Utc>,
}

impl ScreenshotSnapshot {
    /// True when vision produced nothing and agents must rely on the DOM
    /// excerpt alone.
    pub fn is_degraded(&self) -> bool {
        self.elements.is_empty()
    }
}
