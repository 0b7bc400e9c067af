//! Usage-frequency classification.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use stocklens_inventory::{InventoryItem, ItemId, MovementEvent};

use crate::config::AnalyticsConfig;
use crate::window::Window;

/// Window-relative movement frequency.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageFrequency {
    High,
    Medium,
    Low,
}

impl UsageFrequency {
    pub fn classify(total_movements: usize, window: Window, config: &AnalyticsConfig) -> Self {
        let n = total_movements as f64;
        let days = window.days_f64();
        if n >= days * config.high_frequency_ratio {
            UsageFrequency::High
        } else if n >= days * config.medium_frequency_ratio {
            UsageFrequency::Medium
        } else {
            UsageFrequency::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageAnalytics {
    pub item_id: ItemId,
    pub item_name: String,
    pub category: String,
    /// Movements of any kind.
    pub total_movements: usize,
    /// Consumption-type quantity only.
    pub total_quantity_used: f64,
    pub average_daily_usage: f64,
    /// Latest movement in the window, else the item's creation time.
    pub last_movement: Option<DateTime<Utc>>,
    pub usage_frequency: UsageFrequency,
}

#[derive(Default)]
struct Tally {
    movements: usize,
    consumed: f64,
    last: Option<DateTime<Utc>>,
}

/// One entry per item (depleted items included), heaviest usage first.
pub fn classify_usage(
    items: &[InventoryItem],
    movements: &[MovementEvent],
    window: Window,
    as_of: &DateTime<FixedOffset>,
    config: &AnalyticsConfig,
) -> Vec<UsageAnalytics> {
    let mut tallies: HashMap<&ItemId, Tally> = HashMap::new();
    for ev in movements.iter().filter(|m| window.contains(m.timestamp, as_of)) {
        let t = tallies.entry(&ev.item_id).or_default();
        t.movements += 1;
        if ev.is_consumption() {
            t.consumed += ev.quantity;
        }
        t.last = t.last.max(Some(ev.timestamp));
    }

    let mut usage: Vec<UsageAnalytics> = items
        .iter()
        .map(|item| {
            let tally = tallies.get(&item.id);
            let total_movements = tally.map_or(0, |t| t.movements);
            let total_quantity_used = tally.map_or(0.0, |t| t.consumed);

            UsageAnalytics {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                category: item.category.clone(),
                total_movements,
                total_quantity_used,
                average_daily_usage: total_quantity_used / window.days_f64(),
                last_movement: tally.and_then(|t| t.last).or(item.created_at),
                usage_frequency: UsageFrequency::classify(total_movements, window, config),
            }
        })
        .collect();

    usage.sort_by(|a, b| b.total_quantity_used.total_cmp(&a.total_quantity_used));
    usage
}
