pub mod string_util;

pub use string_util::{StripCodeBlock, truncate_chars};

/// Install a default fmt subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}
