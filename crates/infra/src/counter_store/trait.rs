use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

use billkit_numbering::{CounterKey, SequenceCounter};

/// Counter store operation error.
///
/// These are **infrastructure errors** (storage, concurrency) as opposed to
/// domain errors (validation, invariants). The allocator treats `Backend` as
/// retry-worthy and `Conflict` as a concurrent-create signal it can recover
/// from.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Persistent store of per-company sequence counters.
///
/// ## Design Principles
///
/// - **No storage assumptions**: works with the in-memory implementation
///   (tests/dev) and the Postgres backend (production)
/// - **Atomic increment**: `increment` is a single increment-and-fetch
///   operation at the storage boundary; callers never read a counter value
///   and write it back, so concurrent allocations for the same key cannot
///   observe the same number
/// - **Lazy creation**: counters come into existence through `create` on the
///   first allocation for a key; the store never deletes them
///
/// ## Key Semantics
///
/// Counters are keyed by `(company_id, kind, financial_year)`. Within a key,
/// `current_number` is monotonically increasing: every successful `increment`
/// returns exactly the previous value plus one.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Read-only lookup of a counter.
    async fn find(&self, key: &CounterKey) -> Result<Option<SequenceCounter>, StoreError>;

    /// Insert a fresh counter.
    ///
    /// Returns `Conflict` when a counter for the key already exists (a
    /// concurrent first allocation won the race).
    async fn create(&self, counter: SequenceCounter) -> Result<SequenceCounter, StoreError>;

    /// Atomically add one to `current_number`, bump `updated_at`, and return
    /// the updated counter. Returns `None` when no counter exists for the key.
    async fn increment(
        &self,
        key: &CounterKey,
        now: DateTime<Utc>,
    ) -> Result<Option<SequenceCounter>, StoreError>;

    /// Persist the final formatting prefix and the formatted number that was
    /// handed out for the counter's latest value.
    async fn record_issue(
        &self,
        key: &CounterKey,
        prefix: &str,
        number: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> CounterStore for Arc<S>
where
    S: CounterStore + ?Sized,
{
    async fn find(&self, key: &CounterKey) -> Result<Option<SequenceCounter>, StoreError> {
        (**self).find(key).await
    }

    async fn create(&self, counter: SequenceCounter) -> Result<SequenceCounter, StoreError> {
        (**self).create(counter).await
    }

    async fn increment(
        &self,
        key: &CounterKey,
        now: DateTime<Utc>,
    ) -> Result<Option<SequenceCounter>, StoreError> {
        (**self).increment(key, now).await
    }

    async fn record_issue(
        &self,
        key: &CounterKey,
        prefix: &str,
        number: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        (**self).record_issue(key, prefix, number, now).await
    }
}
