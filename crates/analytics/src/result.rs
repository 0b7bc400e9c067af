//! Combined analytics output handed to the presentation layer.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::category::CategoryBreakdown;
use crate::forecast::StockPrediction;
use crate::timeseries::{DailyMovement, zero_series};
use crate::top_value::InventoryValueItem;
use crate::usage::UsageAnalytics;
use crate::valuation::InventorySummary;
use crate::window::Window;

/// Inventory analytics for one scope and window.
///
/// Recomputed on every request; has no identity and is never persisted by
/// the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    #[serde(flatten)]
    pub summary: InventorySummary,
    pub top_value_items: Vec<InventoryValueItem>,
    pub stock_movements: Vec<DailyMovement>,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub stock_predictions: Vec<StockPrediction>,
    pub usage_analytics: Vec<UsageAnalytics>,
    pub window_days: u32,
    pub generated_at: DateTime<Utc>,
}

impl AnalyticsResult {
    /// All-zero result: zero aggregates, empty lists, zero-filled daily series.
    pub fn empty(window: Window, as_of: &DateTime<FixedOffset>) -> Self {
        Self {
            summary: InventorySummary::default(),
            top_value_items: Vec::new(),
            stock_movements: zero_series(window, as_of),
            category_breakdown: Vec::new(),
            stock_predictions: Vec::new(),
            usage_analytics: Vec::new(),
            window_days: window.days(),
            generated_at: as_of.with_timezone(&Utc),
        }
    }

    /// False when there is nothing to show (render a "no data" state).
    pub fn has_data(&self) -> bool {
        self.summary.total_items > 0 || self.stock_movements.iter().any(|d| d.movements > 0)
    }
}
