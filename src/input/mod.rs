pub mod model;

pub use model::Command;
