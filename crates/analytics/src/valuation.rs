//! Snapshot-wide valuation aggregates.

use serde::{Deserialize, Serialize};

use stocklens_inventory::InventoryItem;

/// Scalar aggregates over the whole items snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_items: usize,
    pub total_value: f64,
    /// Items tagged `low` or `critical`.
    pub low_stock_items: usize,
    /// Items tagged `out`.
    pub out_of_stock_items: usize,
    /// Mean of `current_stock / max(minimum_stock, 1)`.
    pub average_stock_level: f64,
}

/// Compute [`InventorySummary`]; all zeros for an empty snapshot.
pub fn summarize(items: &[InventoryItem]) -> InventorySummary {
    if items.is_empty() {
        return InventorySummary::default();
    }

    let total_value = guard_nan(items.iter().map(InventoryItem::stock_value).sum());
    let low_stock_items = items.iter().filter(|i| i.status.is_low()).count();
    let out_of_stock_items = items.iter().filter(|i| i.status.is_out()).count();

    InventorySummary {
        total_items: items.len(),
        total_value,
        low_stock_items,
        out_of_stock_items,
        average_stock_level: mean_stock_ratio(items),
    }
}

/// Mean stock ratio; `0` for an empty slice.
pub(crate) fn mean_stock_ratio<'a>(items: impl IntoIterator<Item = &'a InventoryItem>) -> f64 {
    let (sum, n) = items
        .into_iter()
        .fold((0.0_f64, 0usize), |(sum, n), i| (sum + i.stock_ratio(), n + 1));
    if n == 0 {
        return 0.0;
    }
    guard_nan(sum / n as f64)
}

pub(crate) fn guard_nan(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x }
}
