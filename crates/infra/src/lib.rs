//! Infrastructure layer: data-source adapters and the background refresh runner.

pub mod adapters;
pub mod read_model;
pub mod runner;


pub use adapters::{InMemoryItemRepository, InMemoryMovementLog, JsonSnapshotSource};
pub use read_model::{InMemoryTenantStore, TenantStore};
pub use runner::{
    AnalyticsRunner, AnalyticsRunnerHandle, AnalyticsSink, InMemoryAnalyticsSink, RunnerConfig,
    RunnerError,
};
