use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use stocklens_analytics::{ItemSource, MovementSource, SourceError};
use stocklens_core::{TenantId, TenantScope};
use stocklens_inventory::{InventoryItem, ItemId, MovementEvent};

use crate::read_model::{InMemoryTenantStore, TenantStore};

/// Items snapshot backed by a tenant store.
#[derive(Debug)]
pub struct InMemoryItemRepository<S = InMemoryTenantStore<ItemId, InventoryItem>>
where
    S: TenantStore<ItemId, InventoryItem>,
{
    store: S,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self {
            store: InMemoryTenantStore::new(),
        }
    }
}

impl Default for InMemoryItemRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> InMemoryItemRepository<S>
where
    S: TenantStore<ItemId, InventoryItem>,
{
    pub fn with_store(store: S) -> Self {
        Self { store }
    }

    pub fn upsert(&self, tenant_id: TenantId, item: InventoryItem) {
        self.store.upsert(tenant_id, item.id.clone(), item);
    }

    /// Remove an item; movements referencing it are left in place.
    pub fn remove(&self, tenant_id: TenantId, item_id: &ItemId) -> Option<InventoryItem> {
        self.store.remove(tenant_id, item_id)
    }
}

impl<S> ItemSource for InMemoryItemRepository<S>
where
    S: TenantStore<ItemId, InventoryItem>,
{
    fn fetch_items(&self, scope: &TenantScope) -> Result<Vec<InventoryItem>, SourceError> {
        Ok(self
            .store
            .list(scope.tenant_id)
            .into_iter()
            .filter(|i| scope.allows(scope.tenant_id, i.location_id))
            .collect())
    }
}

/// Append-only movement log, partitioned by tenant.
#[derive(Debug, Default)]
pub struct InMemoryMovementLog {
    inner: RwLock<HashMap<TenantId, Vec<MovementEvent>>>,
}

impl InMemoryMovementLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, tenant_id: TenantId, event: MovementEvent) {
        if let Ok(mut map) = self.inner.write() {
            map.entry(tenant_id).or_default().push(event);
        }
    }

    pub fn len(&self, tenant_id: TenantId) -> usize {
        self.inner
            .read()
            .map(|m| m.get(&tenant_id).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, tenant_id: TenantId) -> bool {
        self.len(tenant_id) == 0
    }
}

impl MovementSource for InMemoryMovementLog {
    fn fetch_movements(
        &self,
        scope: &TenantScope,
        since: DateTime<Utc>,
    ) -> Result<Vec<MovementEvent>, SourceError> {
        let map = self
            .inner
            .read()
            .map_err(|_| SourceError::Unavailable("movement log lock poisoned".to_string()))?;

        Ok(map
            .get(&scope.tenant_id)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.timestamp >= since && scope.allows(scope.tenant_id, e.location_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
