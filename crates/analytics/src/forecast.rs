//! Stock-depletion forecasting.
//!
//! Model (linear-rate extrapolation):
//! - `daily_usage_rate = consumed quantity in window / window days`
//! - `days_until_empty = current_stock / daily_usage_rate`
//! - reorder when stock would cross `minimum_stock`:
//!   `today + floor(max(0, days_until_empty - minimum_stock / daily_usage_rate))`
//!
//! Items with no usable consumption data get the "no forecast" sentinel:
//! rate `0`, [`DaysUntilEmpty::Never`], tier `good`, and a reorder date one
//! horizon out, pushed past the latest real reorder date in the batch when
//! a forecast reaches further than that.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Days, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use stocklens_inventory::{InventoryItem, ItemId, MovementEvent};

use crate::config::AnalyticsConfig;
use crate::window::Window;

/// Projected runway until stock reaches zero.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DaysUntilEmpty {
    Days(f64),
    /// No consumption observed; the item is not depleting.
    Never,
}

impl DaysUntilEmpty {
    /// `f64::INFINITY` for [`DaysUntilEmpty::Never`].
    pub fn as_f64(self) -> f64 {
        match self {
            DaysUntilEmpty::Days(d) => d,
            DaysUntilEmpty::Never => f64::INFINITY,
        }
    }

    pub fn is_never(self) -> bool {
        matches!(self, DaysUntilEmpty::Never)
    }

    /// Total order; `Never` sorts after every finite runway.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.as_f64().total_cmp(&other.as_f64())
    }
}

impl PartialOrd for DaysUntilEmpty {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.total_cmp(other))
    }
}

// JSON has no infinity; `Never` travels as `null`.
impl Serialize for DaysUntilEmpty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DaysUntilEmpty::Days(d) => serializer.serialize_f64(*d),
            DaysUntilEmpty::Never => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for DaysUntilEmpty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<f64>::deserialize(deserializer)? {
            Some(d) if d.is_finite() => DaysUntilEmpty::Days(d),
            _ => DaysUntilEmpty::Never,
        })
    }
}

/// Urgency tier derived from days until empty.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyTier {
    Urgent,
    Warning,
    Good,
}

impl UrgencyTier {
    /// Boundaries are inclusive on the more urgent tier.
    pub fn classify(days: DaysUntilEmpty, config: &AnalyticsConfig) -> Self {
        match days {
            DaysUntilEmpty::Never => UrgencyTier::Good,
            DaysUntilEmpty::Days(d) if d <= config.urgent_days => UrgencyTier::Urgent,
            DaysUntilEmpty::Days(d) if d <= config.warning_days => UrgencyTier::Warning,
            DaysUntilEmpty::Days(_) => UrgencyTier::Good,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPrediction {
    pub item_id: ItemId,
    pub item_name: String,
    pub current_stock: f64,
    pub unit: String,
    pub daily_usage_rate: f64,
    pub days_until_empty: DaysUntilEmpty,
    pub recommended_reorder_date: NaiveDate,
    pub status: UrgencyTier,
}

/// Forecast depletion for every item with positive stock, most urgent first.
///
/// Items at zero stock are already depleted and get no prediction. Only
/// consumption-type movements inside the window contribute to usage.
pub fn forecast_depletion(
    items: &[InventoryItem],
    movements: &[MovementEvent],
    window: Window,
    as_of: &DateTime<FixedOffset>,
    config: &AnalyticsConfig,
) -> Vec<StockPrediction> {
    let consumed = consumption_by_item(movements, window, as_of);
    let today = Window::today(as_of);
    let horizon = today
        .checked_add_days(Days::new(u64::from(config.no_usage_horizon_days)))
        .unwrap_or(NaiveDate::MAX);

    let mut predictions: Vec<StockPrediction> = items
        .iter()
        .filter(|item| item.current_stock > 0.0)
        .map(|item| {
            let total_usage = consumed.get(&item.id).copied();
            predict(item, total_usage, window, today, horizon, config)
        })
        .collect();

    let latest_real = predictions
        .iter()
        .filter(|p| !p.days_until_empty.is_never())
        .map(|p| p.recommended_reorder_date)
        .max();
    if let Some(latest) = latest_real.filter(|d| *d >= horizon) {
        let sentinel = latest.succ_opt().unwrap_or(NaiveDate::MAX);
        for p in predictions.iter_mut().filter(|p| p.days_until_empty.is_never()) {
            p.recommended_reorder_date = sentinel;
        }
    }

    predictions.sort_by(|a, b| a.days_until_empty.total_cmp(&b.days_until_empty));
    predictions
}

/// Total consumed quantity per item; items with no consumption events are absent.
fn consumption_by_item<'a>(
    movements: &'a [MovementEvent],
    window: Window,
    as_of: &DateTime<FixedOffset>,
) -> HashMap<&'a ItemId, f64> {
    let mut consumed: HashMap<&ItemId, f64> = HashMap::new();
    for ev in movements
        .iter()
        .filter(|m| m.is_consumption() && window.contains(m.timestamp, as_of))
    {
        *consumed.entry(&ev.item_id).or_insert(0.0) += ev.quantity;
    }
    consumed
}

fn predict(
    item: &InventoryItem,
    total_usage: Option<f64>,
    window: Window,
    today: NaiveDate,
    horizon: NaiveDate,
    config: &AnalyticsConfig,
) -> StockPrediction {
    let rate = total_usage.map(|u| u / window.days_f64()).unwrap_or(0.0);

    // Zero or degenerate usage: sentinel forecast.
    if !(rate.is_finite() && rate > 0.0) {
        return StockPrediction {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            current_stock: item.current_stock,
            unit: item.unit.clone(),
            daily_usage_rate: 0.0,
            days_until_empty: DaysUntilEmpty::Never,
            recommended_reorder_date: horizon,
            status: UrgencyTier::Good,
        };
    }

    let days_until_empty = item.current_stock / rate;
    let days_until_reorder = (days_until_empty - item.minimum_stock / rate).max(0.0);
    let days = DaysUntilEmpty::Days(days_until_empty);

    StockPrediction {
        item_id: item.id.clone(),
        item_name: item.name.clone(),
        current_stock: item.current_stock,
        unit: item.unit.clone(),
        daily_usage_rate: rate,
        days_until_empty: days,
        recommended_reorder_date: reorder_date(today, days_until_reorder),
        status: UrgencyTier::classify(days, config),
    }
}

/// `today + floor(days)`, saturating at the last representable date.
fn reorder_date(today: NaiveDate, days: f64) -> NaiveDate {
    // `as` saturates for huge values.
    let offset = days.floor() as u64;
    today
        .checked_add_days(Days::new(offset))
        .unwrap_or(NaiveDate::MAX)
}
