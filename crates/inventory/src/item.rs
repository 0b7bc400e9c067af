use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use stocklens_core::LocationId;

use crate::coerce::{number_field, parse_field, string_field, timestamp_field};

/// Inventory item identifier (opaque, unique within a tenant).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Stock status tag as supplied by the item store.
///
/// The analytics engine treats this as opaque input and never re-derives it
/// from stock levels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    #[default]
    Good,
    Low,
    Critical,
    Out,
}

impl StockStatus {
    /// Lenient parse; unknown tags are treated as `Good`.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "low" => StockStatus::Low,
            "critical" => StockStatus::Critical,
            "out" => StockStatus::Out,
            _ => StockStatus::Good,
        }
    }

    /// `low` or `critical` (still has stock, below threshold).
    pub fn is_low(self) -> bool {
        matches!(self, StockStatus::Low | StockStatus::Critical)
    }

    pub fn is_out(self) -> bool {
        self == StockStatus::Out
    }

    /// Any of `low`, `critical`, `out`.
    pub fn needs_attention(self) -> bool {
        self.is_low() || self.is_out()
    }
}

/// Inventory item exactly as persisted (loosely typed).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawInventoryItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub current_stock: f64,
    pub minimum_stock: f64,
    pub cost_per_unit: f64,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub location_id: Option<LocationId>,
}

impl RawInventoryItem {
    /// Read a stored record field by field.
    ///
    /// Stored names are camelCase with snake_case accepted as a fallback.
    /// Returns `None` only when the record is not a JSON object.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let record = value.as_object()?;
        Some(Self {
            id: string_field(record, &["id"]),
            name: string_field(record, &["name"]),
            category: string_field(record, &["category"]),
            unit: string_field(record, &["unit"]),
            current_stock: number_field(record, &["currentStock", "current_stock"]),
            minimum_stock: number_field(record, &["minimumStock", "minimum_stock"]),
            cost_per_unit: number_field(record, &["costPerUnit", "cost_per_unit"]),
            status: string_field(record, &["status"]),
            created_at: timestamp_field(record, &["createdAt", "created_at"]),
            location_id: parse_field(record, &["locationId", "location_id"]),
        })
    }

    /// Single normalization pass: every numeric field is finite and non-negative afterwards.
    pub fn normalize(self) -> InventoryItem {
        InventoryItem {
            id: ItemId(self.id),
            name: self.name,
            category: self.category,
            unit: self.unit,
            current_stock: non_negative(self.current_stock),
            minimum_stock: non_negative(self.minimum_stock),
            cost_per_unit: non_negative(self.cost_per_unit),
            status: StockStatus::parse(&self.status),
            created_at: self.created_at,
            location_id: self.location_id,
        }
    }
}

/// Normalize a batch of stored item records.
///
/// Each record is read on its own; entries that are not objects are skipped
/// without affecting the rest of the batch.
pub fn normalize_items<'a>(records: impl IntoIterator<Item = &'a JsonValue>) -> Vec<InventoryItem> {
    let mut dropped = 0usize;
    let items: Vec<InventoryItem> = records
        .into_iter()
        .filter_map(|value| {
            let raw = RawInventoryItem::from_json(value);
            if raw.is_none() {
                dropped += 1;
            }
            raw.map(RawInventoryItem::normalize)
        })
        .collect();

    if dropped > 0 {
        debug!(dropped, kept = items.len(), "dropped item records that are not objects");
    }
    items
}

fn non_negative(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 { x } else { 0.0 }
}

/// Normalized inventory item snapshot.
///
/// `current_stock`, `minimum_stock` and `cost_per_unit` are always finite and `>= 0`
/// when built through [`RawInventoryItem::normalize`] or the builder methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub current_stock: f64,
    pub minimum_stock: f64,
    /// `0` means unpriced.
    pub cost_per_unit: f64,
    pub status: StockStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub location_id: Option<LocationId>,
}

impl InventoryItem {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            unit: String::new(),
            current_stock: 0.0,
            minimum_stock: 0.0,
            cost_per_unit: 0.0,
            status: StockStatus::Good,
            created_at: None,
            location_id: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_stock(mut self, current: f64, minimum: f64) -> Self {
        self.current_stock = non_negative(current);
        self.minimum_stock = non_negative(minimum);
        self
    }

    pub fn with_cost(mut self, cost_per_unit: f64) -> Self {
        self.cost_per_unit = non_negative(cost_per_unit);
        self
    }

    pub fn with_status(mut self, status: StockStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_location(mut self, location_id: LocationId) -> Self {
        self.location_id = Some(location_id);
        self
    }

    /// `cost_per_unit × current_stock`, never NaN.
    pub fn stock_value(&self) -> f64 {
        let value = self.cost_per_unit * self.current_stock;
        if value.is_nan() { 0.0 } else { value }
    }

    /// `current_stock / max(minimum_stock, 1)`.
    pub fn stock_ratio(&self) -> f64 {
        self.current_stock / self.minimum_stock.max(1.0)
    }
}
