pub mod action;
pub mod session;
pub mod snapshot;

pub use action::{BrowserAction, Extraction};
pub use session::{BrowserSession, SessionProvider, Viewport};
pub use snapshot::ScreenshotSnapshot;
