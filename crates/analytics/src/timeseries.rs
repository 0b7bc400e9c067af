//! Daily movement series for charting.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use stocklens_inventory::{ItemId, MovementEvent};

use crate::window::Window;

/// Movement activity on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMovement {
    pub date: NaiveDate,
    pub movements: usize,
    /// Sum of movement magnitudes, direction-agnostic.
    pub total_quantity_changed: f64,
    /// Distinct item ids moved that day (dangling ids included).
    pub items_affected: usize,
}

impl DailyMovement {
    pub fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            movements: 0,
            total_quantity_changed: 0.0,
            items_affected: 0,
        }
    }
}

/// Zero-filled series with exactly `window.days()` entries, oldest first.
pub fn zero_series(window: Window, as_of: &DateTime<FixedOffset>) -> Vec<DailyMovement> {
    window.dates(as_of).map(DailyMovement::zero).collect()
}

/// Bucket movements by local calendar day across the window.
///
/// Days without events are present with zero counts; the result always has
/// exactly `window.days()` entries.
pub fn daily_movements(
    movements: &[MovementEvent],
    window: Window,
    as_of: &DateTime<FixedOffset>,
) -> Vec<DailyMovement> {
    let mut series = zero_series(window, as_of);
    let mut distinct: Vec<HashSet<&ItemId>> = vec![HashSet::new(); series.len()];
    let start = window.start_date(as_of);

    for ev in movements.iter().filter(|m| window.contains(m.timestamp, as_of)) {
        let date = Window::local_date(ev.timestamp, as_of);
        let Ok(idx) = usize::try_from((date - start).num_days()) else {
            continue;
        };
        let Some(day) = series.get_mut(idx) else {
            continue;
        };
        day.movements += 1;
        day.total_quantity_changed += ev.quantity.abs();
        distinct[idx].insert(&ev.item_id);
    }

    for (day, items) in series.iter_mut().zip(&distinct) {
        day.items_affected = items.len();
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;
    use stocklens_inventory::MovementKind;

    fn as_of() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-06-10T12:00:00-05:00").unwrap()
    }

    fn at(hours_ago: i64) -> DateTime<Utc> {
        as_of().with_timezone(&Utc) - Duration::hours(hours_ago)
    }

    #[test]
    fn empty_input_yields_zero_filled_series() {
        let series = daily_movements(&[], Window::new(7).unwrap(), &as_of());
        assert_eq!(series.len(), 7);
        assert!(series.iter().all(|d| d.movements == 0 && d.items_affected == 0));
        assert_eq!(series[6].date, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
    }

    #[test]
    fn buckets_by_local_day() {
        let movements = vec![
            MovementEvent::new("a", 2.0, MovementKind::Usage, at(1)),
            MovementEvent::new("a", 3.0, MovementKind::Add, at(2)),
            MovementEvent::new("b", 1.5, MovementKind::Subtract, at(3)),
            // yesterday afternoon local time
            MovementEvent::new("ghost", 4.0, MovementKind::Adjustment, at(20)),
        ];

        let series = daily_movements(&movements, Window::new(3).unwrap(), &as_of());
        assert_eq!(series.len(), 3);

        let today = &series[2];
        assert_eq!(today.movements, 3);
        assert_eq!(today.total_quantity_changed, 6.5);
        assert_eq!(today.items_affected, 2);

        let yesterday = &series[1];
        assert_eq!(yesterday.movements, 1);
        assert_eq!(yesterday.items_affected, 1);
        assert_eq!(yesterday.total_quantity_changed, 4.0);

        assert_eq!(series[0], DailyMovement::zero(series[0].date));
    }

    #[test]
    fn events_outside_the_window_are_ignored() {
        let movements = vec![
            MovementEvent::new("a", 1.0, MovementKind::Usage, at(24 * 10)),
            MovementEvent::new("a", 1.0, MovementKind::Usage, at(-5)),
        ];
        let series = daily_movements(&movements, Window::new(2).unwrap(), &as_of());
        assert!(series.iter().all(|d| d.movements == 0));
    }

    proptest! {
        /// Property: the series always has exactly `days` entries.
        #[test]
        fn series_has_fixed_length(
            days in 1u32..120,
            offsets in prop::collection::vec(0i64..24 * 200, 0..60)
        ) {
            let movements: Vec<_> = offsets
                .iter()
                .map(|h| MovementEvent::new("x", 1.0, MovementKind::Usage, at(*h)))
                .collect();
            let series = daily_movements(&movements, Window::new(days).unwrap(), &as_of());
            prop_assert_eq!(series.len(), days as usize);

            let counted: usize = series.iter().map(|d| d.movements).sum();
            prop_assert!(counted <= movements.len());
        }
    }
}
