//! Numbering domain module.
//!
//! This crate contains the business rules for document sequence numbers:
//! the April–March financial year, per-company counters, configurable
//! prefixes, and number formatting. It is deterministic domain logic
//! (no IO, no HTTP, no storage) — reference time is always passed in by
//! the caller.

pub mod counter;
pub mod fiscal;
pub mod format;
pub mod settings;

pub use counter::{CounterKey, SequenceCounter};
pub use fiscal::FinancialYear;
pub use format::{fallback_number, format_padded, prefix_with_year};
pub use settings::NumberingSettings;
