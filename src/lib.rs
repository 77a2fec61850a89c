pub mod agent;
pub mod agents;
pub mod browser;
pub mod error;
pub mod input;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod registry;
pub mod utils;
pub mod vision;

pub use error::{Error, Result};
