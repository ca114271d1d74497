//! Sequence counter storage boundary.
//!
//! This module defines an infrastructure-facing abstraction for persisting
//! per-company sequence counters without making any storage assumptions. The
//! increment primitive is atomic so allocation is race-free per counter key.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCounterStore;
pub use postgres::PostgresCounterStore;
pub use r#trait::{CounterStore, StoreError};
