//! Tracing/logging setup shared by every process embedding the engine.

/// Initialize process-wide JSON logging from the environment.
///
/// Returns `false` if a subscriber was already installed.
pub fn init() -> bool {
    tracing::init()
}

pub use tracing::init_with_filter;

/// Tracing configuration (filters, layers).
pub mod tracing;
