//! `stocklens-core`: shared primitives.
//!
//! This crate contains **pure** building blocks (no IO, no storage concerns).

pub mod error;
pub mod id;
pub mod scope;

pub use error::{DomainError, DomainResult};
pub use id::{LocationId, TenantId};
pub use scope::TenantScope;
