//! Highest-value items currently in stock.

use serde::{Deserialize, Serialize};

use stocklens_inventory::{InventoryItem, ItemId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryValueItem {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub current_stock: f64,
    pub unit: String,
    pub cost_per_unit: f64,
    pub total_value: f64,
    pub stock_ratio: f64,
}

impl From<&InventoryItem> for InventoryValueItem {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            current_stock: item.current_stock,
            unit: item.unit.clone(),
            cost_per_unit: item.cost_per_unit,
            total_value: item.stock_value(),
            stock_ratio: item.stock_ratio(),
        }
    }
}

/// Up to `limit` priced, in-stock items, highest total value first.
pub fn top_value_items(items: &[InventoryItem], limit: usize) -> Vec<InventoryValueItem> {
    let mut ranked: Vec<InventoryValueItem> = items
        .iter()
        .filter(|i| i.cost_per_unit > 0.0 && i.current_stock > 0.0)
        .map(InventoryValueItem::from)
        .collect();

    ranked.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
    ranked.truncate(limit);
    ranked
}
