//! Snapshot file adapter.
//!
//! Reads `{ "tenantId": ..., "items": [...], "movements": [...] }` with raw,
//! loosely-typed records. The file is re-read on every fetch so a refreshed
//! export is picked up by the next recomputation.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use stocklens_analytics::{ItemSource, MovementSource, SourceError};
use stocklens_core::{TenantId, TenantScope};
use stocklens_inventory::{InventoryItem, MovementEvent, normalize_items, normalize_movements};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    /// When present, reads for any other tenant are refused.
    #[serde(default)]
    tenant_id: Option<TenantId>,
    /// Records stay untyped here; each one is normalized on its own.
    #[serde(default)]
    items: Vec<JsonValue>,
    #[serde(default)]
    movements: Vec<JsonValue>,
}

#[derive(Debug, Clone)]
pub struct JsonSnapshotSource {
    path: PathBuf,
}

impl JsonSnapshotSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self, scope: &TenantScope) -> Result<Snapshot, SourceError> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            SourceError::Unavailable(format!("{}: {e}", self.path.display()))
        })?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes)
            .map_err(|e| SourceError::Malformed(format!("{}: {e}", self.path.display())))?;

        if let Some(owner) = snapshot.tenant_id {
            if owner != scope.tenant_id {
                return Err(SourceError::TenantIsolation(format!(
                    "snapshot belongs to tenant {owner}, requested {}",
                    scope.tenant_id
                )));
            }
        }

        debug!(
            path = %self.path.display(),
            items = snapshot.items.len(),
            movements = snapshot.movements.len(),
            "read inventory snapshot"
        );
        Ok(snapshot)
    }
}

impl ItemSource for JsonSnapshotSource {
    fn fetch_items(&self, scope: &TenantScope) -> Result<Vec<InventoryItem>, SourceError> {
        let snapshot = self.read(scope)?;
        Ok(normalize_items(&snapshot.items)
            .into_iter()
            .filter(|i| scope.allows(scope.tenant_id, i.location_id))
            .collect())
    }
}

impl MovementSource for JsonSnapshotSource {
    fn fetch_movements(
        &self,
        scope: &TenantScope,
        since: DateTime<Utc>,
    ) -> Result<Vec<MovementEvent>, SourceError> {
        let snapshot = self.read(scope)?;
        Ok(normalize_movements(&snapshot.movements)
            .into_iter()
            .filter(|m| m.timestamp >= since && scope.allows(scope.tenant_id, m.location_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_snapshot(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_and_normalizes_raw_records() {
        let file = write_snapshot(
            r#"{
                "items": [
                    { "id": "i1", "name": "Flour", "currentStock": "12", "costPerUnit": "1.5" },
                    { "id": 7, "name": "Bad", "currentStock": "abc" }
                ],
                "movements": [
                    { "itemId": "i1", "quantity": 2, "movementKind": "usage", "timestamp": "2024-06-09T10:00:00Z" },
                    { "itemId": "i1", "quantity": 2, "movementKind": "usage", "timestamp": "2024-05-01T10:00:00Z" },
                    { "itemId": "i1", "quantity": 2, "movementKind": "usage" }
                ]
            }"#,
        );
        let source = JsonSnapshotSource::new(file.path());
        assert_eq!(source.path(), file.path());
        let scope = TenantScope::tenant(TenantId::new());

        let items = source.fetch_items(&scope).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].current_stock, 12.0);
        assert_eq!(items[0].cost_per_unit, 1.5);
        assert_eq!(items[1].id.as_str(), "7");
        assert_eq!(items[1].current_stock, 0.0);

        let since = DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let movements = source.fetch_movements(&scope, since).unwrap();
        assert_eq!(movements.len(), 1);
    }

    #[test]
    fn bad_records_do_not_discard_the_snapshot() {
        let file = write_snapshot(
            r#"{
                "items": [
                    { "id": "i1", "currentStock": 4, "current_stock": 40 },
                    "garbage"
                ],
                "movements": [
                    {
                        "itemId": "i1",
                        "quantity": 1,
                        "movementKind": "usage",
                        "timestamp": "2024-06-09T10:00:00Z",
                        "createdAt": "2024-06-08T10:00:00Z"
                    },
                    17
                ]
            }"#,
        );
        let source = JsonSnapshotSource::new(file.path());
        let scope = TenantScope::tenant(TenantId::new());

        let items = source.fetch_items(&scope).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].current_stock, 4.0);

        let since = DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let movements = source.fetch_movements(&scope, since).unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].timestamp.to_rfc3339(), "2024-06-09T10:00:00+00:00");
    }

    #[test]
    fn missing_file_is_unavailable() {
        let source = JsonSnapshotSource::new("/definitely/not/here.json");
        let err = source
            .fetch_items(&TenantScope::tenant(TenantId::new()))
            .unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(_)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let file = write_snapshot("{ not json");
        let err = JsonSnapshotSource::new(file.path())
            .fetch_items(&TenantScope::tenant(TenantId::new()))
            .unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn foreign_tenant_snapshot_is_refused() {
        let owner = TenantId::new();
        let file = write_snapshot(&format!(r#"{{ "tenantId": "{owner}", "items": [] }}"#));
        let source = JsonSnapshotSource::new(file.path());

        assert!(source.fetch_items(&TenantScope::tenant(owner)).is_ok());
        let err = source
            .fetch_items(&TenantScope::tenant(TenantId::new()))
            .unwrap_err();
        assert!(matches!(err, SourceError::TenantIsolation(_)));
    }
}
