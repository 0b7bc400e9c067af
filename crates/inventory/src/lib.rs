//! Inventory data model consumed by the analytics engine.
//!
//! Records arrive "raw" (as persisted, loosely typed) and are normalized once
//! into clean values before any computation runs. Nothing here performs IO.

pub mod coerce;
pub mod item;
pub mod movement;

pub use item::{InventoryItem, ItemId, RawInventoryItem, StockStatus, normalize_items};
pub use movement::{MovementEvent, MovementKind, RawMovementEvent, normalize_movements};
