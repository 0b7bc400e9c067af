//! `stocklens-analytics`
//!
//! Inventory analytics and stock-depletion forecasting.
//!
//! Given an items snapshot and a window of stock movements, computes:
//! - valuation aggregates and a per-category breakdown
//! - a gap-free daily movement series
//! - per-item depletion forecasts (days until empty, reorder date, urgency)
//! - per-item usage-frequency classification
//! - the highest-value items in stock
//!
//! All computation is pure; IO lives behind [`ItemSource`] and [`MovementSource`].

pub mod category;
pub mod config;
pub mod engine;
pub mod forecast;
pub mod result;
pub mod source;
pub mod timeseries;
pub mod top_value;
pub mod usage;
pub mod valuation;
pub mod window;

pub use category::{CategoryBreakdown, breakdown_by_category};
pub use config::AnalyticsConfig;
pub use engine::{AnalyticsEngine, AnalyticsError, analyze};
pub use forecast::{DaysUntilEmpty, StockPrediction, UrgencyTier, forecast_depletion};
pub use result::AnalyticsResult;
pub use source::{ItemSource, MovementSource, SourceError};
pub use timeseries::{DailyMovement, daily_movements};
pub use top_value::{InventoryValueItem, top_value_items};
pub use usage::{UsageAnalytics, UsageFrequency, classify_usage};
pub use valuation::{InventorySummary, summarize};
pub use window::Window;
