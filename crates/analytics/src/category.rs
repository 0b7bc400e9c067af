//! Per-category breakdown.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stocklens_inventory::InventoryItem;

use crate::valuation::{guard_nan, mean_stock_ratio};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: String,
    pub item_count: usize,
    pub total_value: f64,
    pub average_stock_level: f64,
    /// Items tagged `low`, `critical` or `out`.
    pub low_stock_count: usize,
}

/// One entry per distinct category (case-sensitive, unnormalized), highest value first.
///
/// Ties keep category-name order so the output is stable.
pub fn breakdown_by_category(items: &[InventoryItem]) -> Vec<CategoryBreakdown> {
    let mut groups: BTreeMap<&str, Vec<&InventoryItem>> = BTreeMap::new();
    for item in items {
        groups.entry(item.category.as_str()).or_default().push(item);
    }

    let mut breakdown: Vec<CategoryBreakdown> = groups
        .into_iter()
        .map(|(category, members)| CategoryBreakdown {
            category: category.to_string(),
            item_count: members.len(),
            total_value: guard_nan(members.iter().map(|i| i.stock_value()).sum()),
            average_stock_level: mean_stock_ratio(members.iter().copied()),
            low_stock_count: members.iter().filter(|i| i.status.needs_attention()).count(),
        })
        .collect();

    breakdown.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
    breakdown
}
