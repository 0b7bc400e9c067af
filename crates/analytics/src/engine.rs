//! Engine entry points: the pure `analyze` pass and the source-backed `AnalyticsEngine`.

use chrono::{DateTime, FixedOffset, Local, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use stocklens_core::TenantScope;
use stocklens_inventory::{InventoryItem, MovementEvent};

use crate::category::breakdown_by_category;
use crate::config::AnalyticsConfig;
use crate::forecast::forecast_depletion;
use crate::result::AnalyticsResult;
use crate::source::{ItemSource, MovementSource, SourceError};
use crate::timeseries::daily_movements;
use crate::top_value::top_value_items;
use crate::usage::classify_usage;
use crate::valuation::summarize;
use crate::window::Window;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("failed to fetch items: {0}")]
    Items(#[source] SourceError),

    #[error("failed to fetch movements: {0}")]
    Movements(#[source] SourceError),
}

/// Run every analytics component over already-fetched inputs.
///
/// Pure: identical inputs give identical output.
pub fn analyze(
    items: &[InventoryItem],
    movements: &[MovementEvent],
    window: Window,
    as_of: &DateTime<FixedOffset>,
    config: &AnalyticsConfig,
) -> AnalyticsResult {
    debug!(
        items = items.len(),
        movements = movements.len(),
        window_days = window.days(),
        "computing inventory analytics"
    );

    AnalyticsResult {
        summary: summarize(items),
        top_value_items: top_value_items(items, config.top_value_limit),
        stock_movements: daily_movements(movements, window, as_of),
        category_breakdown: breakdown_by_category(items),
        stock_predictions: forecast_depletion(items, movements, window, as_of, config),
        usage_analytics: classify_usage(items, movements, window, as_of, config),
        window_days: window.days(),
        generated_at: as_of.with_timezone(&Utc),
    }
}

/// Inventory analytics engine.
///
/// Reads a snapshot and a movement window from its sources and runs
/// [`analyze`]. Never mutates inventory.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine<I, M> {
    items: I,
    movements: M,
    config: AnalyticsConfig,
}

impl<I, M> AnalyticsEngine<I, M>
where
    I: ItemSource,
    M: MovementSource,
{
    pub fn new(items: I, movements: M) -> Self {
        Self {
            items,
            movements,
            config: AnalyticsConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnalyticsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Analytics as of the local wall clock.
    pub fn compute(&self, scope: &TenantScope, window: Window) -> AnalyticsResult {
        let now: DateTime<FixedOffset> = Local::now().into();
        self.compute_at(scope, window, now)
    }

    /// Analytics as of `as_of`; source failures degrade to [`AnalyticsResult::empty`].
    pub fn compute_at(
        &self,
        scope: &TenantScope,
        window: Window,
        as_of: DateTime<FixedOffset>,
    ) -> AnalyticsResult {
        match self.try_compute_at(scope, window, as_of) {
            Ok(result) => result,
            Err(e) => {
                warn!(scope = %scope, error = %e, "inventory analytics unavailable; returning empty result");
                AnalyticsResult::empty(window, &as_of)
            }
        }
    }

    /// Like [`AnalyticsEngine::compute_at`] but surfaces source failures.
    pub fn try_compute_at(
        &self,
        scope: &TenantScope,
        window: Window,
        as_of: DateTime<FixedOffset>,
    ) -> Result<AnalyticsResult, AnalyticsError> {
        let items = self
            .items
            .fetch_items(scope)
            .map_err(AnalyticsError::Items)?;

        let since = window.start(&as_of);
        let movements = self
            .movements
            .fetch_movements(scope, since)
            .map_err(AnalyticsError::Movements)?;

        Ok(analyze(&items, &movements, window, &as_of, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::Duration;
    use proptest::prelude::*;
    use stocklens_core::TenantId;
    use stocklens_inventory::{MovementKind, RawInventoryItem, StockStatus};

    use crate::forecast::{DaysUntilEmpty, UrgencyTier};

    struct Fixed {
        items: Vec<InventoryItem>,
        movements: Vec<MovementEvent>,
        seen_since: Mutex<Option<DateTime<Utc>>>,
    }

    impl Fixed {
        fn new(items: Vec<InventoryItem>, movements: Vec<MovementEvent>) -> Self {
            Self {
                items,
                movements,
                seen_since: Mutex::new(None),
            }
        }
    }

    impl ItemSource for Fixed {
        fn fetch_items(&self, _scope: &TenantScope) -> Result<Vec<InventoryItem>, SourceError> {
            Ok(self.items.clone())
        }
    }

    impl MovementSource for Fixed {
        fn fetch_movements(
            &self,
            _scope: &TenantScope,
            since: DateTime<Utc>,
        ) -> Result<Vec<MovementEvent>, SourceError> {
            *self.seen_since.lock().unwrap() = Some(since);
            Ok(self.movements.clone())
        }
    }

    struct Down;

    impl ItemSource for Down {
        fn fetch_items(&self, _scope: &TenantScope) -> Result<Vec<InventoryItem>, SourceError> {
            Err(SourceError::Unavailable("store offline".to_string()))
        }
    }

    impl MovementSource for Down {
        fn fetch_movements(
            &self,
            _scope: &TenantScope,
            _since: DateTime<Utc>,
        ) -> Result<Vec<MovementEvent>, SourceError> {
            Err(SourceError::Other(anyhow::anyhow!("connection reset")))
        }
    }

    fn as_of() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-06-10T09:00:00+00:00").unwrap()
    }

    fn days_ago(n: i64) -> DateTime<Utc> {
        as_of().with_timezone(&Utc) - Duration::days(n)
    }

    fn scope() -> TenantScope {
        TenantScope::tenant(TenantId::new())
    }

    fn scenario(stock: f64) -> AnalyticsResult {
        let items = vec![InventoryItem::new("i1", "Flour").with_stock(stock, 5.0).with_cost(2.0)];
        let movements = vec![
            MovementEvent::new("i1", 2.0, MovementKind::Usage, days_ago(1)),
            MovementEvent::new("i1", 2.0, MovementKind::Usage, days_ago(2)),
        ];
        analyze(&items, &movements, Window::new(4).unwrap(), &as_of(), &AnalyticsConfig::default())
    }

    #[test]
    fn steady_usage_scenario() {
        let r = scenario(10.0);
        let p = &r.stock_predictions[0];
        assert_eq!(p.daily_usage_rate, 1.0);
        assert_eq!(p.days_until_empty, DaysUntilEmpty::Days(10.0));
        assert_eq!(p.status, UrgencyTier::Good);
        assert_eq!(r.summary.total_value, 20.0);
        assert_eq!(r.stock_movements.len(), 4);
    }

    #[test]
    fn low_stock_scenario_is_urgent() {
        let r = scenario(3.0);
        let p = &r.stock_predictions[0];
        assert_eq!(p.days_until_empty, DaysUntilEmpty::Days(3.0));
        assert_eq!(p.status, UrgencyTier::Urgent);
    }

    #[test]
    fn empty_inputs_scenario() {
        let r = analyze(&[], &[], Window::new(7).unwrap(), &as_of(), &AnalyticsConfig::default());
        assert_eq!(r.summary.total_items, 0);
        assert_eq!(r.summary.total_value, 0.0);
        assert_eq!(r.stock_movements.len(), 7);
        assert!(r.stock_movements.iter().all(|d| d.movements == 0));
        assert!(r.stock_predictions.is_empty());
        assert!(r.usage_analytics.is_empty());
        assert_eq!(r, AnalyticsResult::empty(Window::new(7).unwrap(), &as_of()));
    }

    #[test]
    fn string_cost_scenario() {
        let raw = RawInventoryItem::from_json(&serde_json::json!({
            "id": "i1", "name": "Sugar", "currentStock": 10, "costPerUnit": "5"
        }))
        .unwrap();
        let r = analyze(
            &[raw.normalize()],
            &[],
            Window::new(7).unwrap(),
            &as_of(),
            &AnalyticsConfig::default(),
        );
        assert_eq!(r.summary.total_value, 50.0);
        assert_eq!(r.top_value_items[0].total_value, 50.0);
    }

    #[test]
    fn engine_requests_movements_from_window_start() {
        let source = std::sync::Arc::new(Fixed::new(vec![], vec![]));
        let engine = AnalyticsEngine::new(source.clone(), source.clone());

        engine.compute_at(&scope(), Window::new(3).unwrap(), as_of());

        let since = source.seen_since.lock().unwrap().unwrap();
        assert_eq!(since.to_rfc3339(), "2024-06-08T00:00:00+00:00");
    }

    #[test]
    fn source_failure_degrades_to_empty_result() {
        let engine = AnalyticsEngine::new(Down, Down);
        let window = Window::new(7).unwrap();

        let r = engine.compute_at(&scope(), window, as_of());
        assert_eq!(r, AnalyticsResult::empty(window, &as_of()));
        assert!(!r.has_data());

        let err = engine.try_compute_at(&scope(), window, as_of()).unwrap_err();
        assert!(matches!(err, AnalyticsError::Items(SourceError::Unavailable(_))));
    }

    #[test]
    fn movement_failure_is_reported_separately() {
        let engine = AnalyticsEngine::new(Fixed::new(vec![], vec![]), Down);
        let err = engine
            .try_compute_at(&scope(), Window::new(1).unwrap(), as_of())
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::Movements(SourceError::Other(_))));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn custom_config_changes_tiers_and_ranking() {
        let cfg = AnalyticsConfig {
            urgent_days: 12.0,
            top_value_limit: 0,
            ..AnalyticsConfig::default()
        };
        let items = vec![InventoryItem::new("i1", "Flour").with_stock(10.0, 0.0).with_cost(2.0)];
        let movements = vec![MovementEvent::new("i1", 4.0, MovementKind::Usage, days_ago(1))];
        let engine = AnalyticsEngine::new(Fixed::new(items, movements.clone()), Fixed::new(vec![], movements))
            .with_config(cfg);
        assert_eq!(engine.config().urgent_days, 12.0);

        let r = engine.compute_at(&scope(), Window::new(4).unwrap(), as_of());
        assert_eq!(r.stock_predictions[0].status, UrgencyTier::Urgent);
        assert!(r.top_value_items.is_empty());
        assert!(r.has_data());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: analysis is a pure function of its inputs.
        #[test]
        fn analysis_is_idempotent(
            rows in prop::collection::vec((0.0f64..500.0, 0.0f64..50.0, 0.0f64..20.0, 0u8..4), 0..20),
            moves in prop::collection::vec((0usize..25, 0.0f64..30.0, 0u8..3, 0i64..15), 0..60),
            days in 1u32..30
        ) {
            let statuses = [StockStatus::Good, StockStatus::Low, StockStatus::Critical, StockStatus::Out];
            let kinds = [MovementKind::Usage, MovementKind::Subtract, MovementKind::Add];
            let items: Vec<_> = rows
                .iter()
                .enumerate()
                .map(|(n, (cur, min, cost, st))| {
                    InventoryItem::new(n.to_string(), format!("item {n}"))
                        .with_category(["a", "b", "c"][n % 3])
                        .with_stock(*cur, *min)
                        .with_cost(*cost)
                        .with_status(statuses[*st as usize])
                })
                .collect();
            let movements: Vec<_> = moves
                .iter()
                .map(|(id, qty, k, ago)| {
                    MovementEvent::new(id.to_string(), *qty, kinds[*k as usize], days_ago(*ago))
                })
                .collect();

            let window = Window::new(days).unwrap();
            let cfg = AnalyticsConfig::default();
            let first = analyze(&items, &movements, window, &as_of(), &cfg);
            let second = analyze(&items, &movements, window, &as_of(), &cfg);

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.stock_movements.len(), days as usize);
            prop_assert!(first.summary.total_value >= 0.0);
            prop_assert_eq!(first.usage_analytics.len(), items.len());
            prop_assert_eq!(
                first.stock_predictions.len(),
                items.iter().filter(|i| i.current_stock > 0.0).count()
            );
        }
    }
}
