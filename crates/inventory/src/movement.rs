use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use stocklens_core::LocationId;

use crate::coerce::{number_field, parse_field, string_field, timestamp_field};
use crate::item::ItemId;

/// Kind of stock-level change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Add,
    Subtract,
    Usage,
    Adjustment,
    Transfer,
    #[serde(other)]
    Other,
}

impl MovementKind {
    /// Lenient parse of a stored movement tag.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "add" | "addition" | "restock" => MovementKind::Add,
            "subtract" | "remove" => MovementKind::Subtract,
            "usage" | "use" => MovementKind::Usage,
            "adjustment" | "correction" => MovementKind::Adjustment,
            "transfer" => MovementKind::Transfer,
            _ => MovementKind::Other,
        }
    }

    /// Consumption-type kinds are the only ones that feed usage rates.
    pub fn is_consumption(self) -> bool {
        matches!(self, MovementKind::Subtract | MovementKind::Usage)
    }
}

/// Stock movement exactly as persisted (loosely typed).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawMovementEvent {
    pub item_id: String,
    pub quantity: f64,
    pub movement_kind: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub location_id: Option<LocationId>,
}

impl RawMovementEvent {
    /// Read a stored record field by field; `None` when it is not a JSON object.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let record = value.as_object()?;
        Some(Self {
            item_id: string_field(record, &["itemId", "item_id"]),
            quantity: number_field(record, &["quantity"]),
            movement_kind: string_field(
                record,
                &["movementKind", "movement_kind", "movementType", "movement_type"],
            ),
            timestamp: timestamp_field(record, &["timestamp", "createdAt", "created_at"]),
            location_id: parse_field(record, &["locationId", "location_id"]),
        })
    }

    /// Normalize into a [`MovementEvent`].
    ///
    /// Returns `None` when the record has no usable timestamp (it cannot be
    /// placed in any window).
    pub fn normalize(self) -> Option<MovementEvent> {
        let timestamp = self.timestamp?;
        Some(MovementEvent {
            item_id: ItemId::new(self.item_id),
            quantity: magnitude(self.quantity),
            kind: MovementKind::parse(&self.movement_kind),
            timestamp,
            location_id: self.location_id,
        })
    }
}

/// Normalize a batch of stored movement records.
///
/// Records that are not objects or carry no usable timestamp are dropped one
/// by one; the rest of the batch is kept.
pub fn normalize_movements<'a>(
    records: impl IntoIterator<Item = &'a JsonValue>,
) -> Vec<MovementEvent> {
    let mut dropped = 0usize;
    let movements: Vec<MovementEvent> = records
        .into_iter()
        .filter_map(|value| {
            let normalized = RawMovementEvent::from_json(value).and_then(RawMovementEvent::normalize);
            if normalized.is_none() {
                dropped += 1;
            }
            normalized
        })
        .collect();

    if dropped > 0 {
        debug!(dropped, kept = movements.len(), "dropped unusable movement records");
    }
    movements
}

fn magnitude(x: f64) -> f64 {
    if x.is_finite() { x.abs() } else { 0.0 }
}

/// Immutable record of a stock-level change.
///
/// `quantity` is a non-negative magnitude; direction is carried by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementEvent {
    /// May reference an item that no longer exists.
    pub item_id: ItemId,
    pub quantity: f64,
    pub kind: MovementKind,
    pub timestamp: DateTime<Utc>,
    pub location_id: Option<LocationId>,
}

impl MovementEvent {
    pub fn new(
        item_id: impl Into<ItemId>,
        quantity: f64,
        kind: MovementKind,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            quantity: magnitude(quantity),
            kind,
            timestamp,
            location_id: None,
        }
    }

    pub fn with_location(mut self, location_id: LocationId) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn is_consumption(&self) -> bool {
        self.kind.is_consumption()
    }
}
