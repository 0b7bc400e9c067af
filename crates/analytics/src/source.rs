//! Read-only data sources feeding the engine.
//!
//! Implementations live in infra (in-memory stores, snapshot files, databases).
//! Both sources return empty collections, not errors, when no data exists.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use stocklens_core::TenantScope;
use stocklens_inventory::{InventoryItem, MovementEvent};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed source data: {0}")]
    Malformed(String),

    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Supplies the current items snapshot for a scope.
pub trait ItemSource: Send + Sync {
    fn fetch_items(&self, scope: &TenantScope) -> Result<Vec<InventoryItem>, SourceError>;
}

/// Supplies stock movements recorded at or after `since`.
pub trait MovementSource: Send + Sync {
    fn fetch_movements(
        &self,
        scope: &TenantScope,
        since: DateTime<Utc>,
    ) -> Result<Vec<MovementEvent>, SourceError>;
}

impl<S> ItemSource for Arc<S>
where
    S: ItemSource + ?Sized,
{
    fn fetch_items(&self, scope: &TenantScope) -> Result<Vec<InventoryItem>, SourceError> {
        (**self).fetch_items(scope)
    }
}

impl<S> MovementSource for Arc<S>
where
    S: MovementSource + ?Sized,
{
    fn fetch_movements(
        &self,
        scope: &TenantScope,
        since: DateTime<Utc>,
    ) -> Result<Vec<MovementEvent>, SourceError> {
        (**self).fetch_movements(scope, since)
    }
}
