//! [`ItemSource`](stocklens_analytics::ItemSource) and
//! [`MovementSource`](stocklens_analytics::MovementSource) implementations.

pub mod in_memory;
pub mod json_file;

pub use in_memory::{InMemoryItemRepository, InMemoryMovementLog};
pub use json_file::JsonSnapshotSource;
