//! JSON log output for stocklens processes.
//!
//! Filter directives come from `STOCKLENS_LOG`, then `RUST_LOG`, then
//! [`DEFAULT_FILTER`].

use tracing_subscriber::EnvFilter;

/// Process-specific filter variable, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "STOCKLENS_LOG";

/// Engine crates log at `info`; dependencies only surface warnings.
pub const DEFAULT_FILTER: &str = "warn,stocklens_analytics=info,stocklens_infra=info,stocklens_inventory=info";

/// Install the JSON subscriber using the environment's filter.
///
/// Returns `false` when a global subscriber was already installed; repeated
/// calls are harmless.
pub fn init() -> bool {
    install(env_filter())
}

/// Install the JSON subscriber with explicit directives.
///
/// Unparseable directives fall back to [`DEFAULT_FILTER`].
pub fn init_with_filter(directives: &str) -> bool {
    install(parse_or_default(directives))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn parse_or_default(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn install(filter: EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(true)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init()
        .is_ok()
}
