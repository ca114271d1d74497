use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use billkit_numbering::{CounterKey, SequenceCounter};

use super::r#trait::{CounterStore, StoreError};

/// In-memory sequence counter store.
///
/// Intended for tests/dev. The write lock makes `increment` a single
/// critical section, so the monotonicity guarantee holds under concurrent
/// allocation just as it does for the Postgres backend.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    counters: RwLock<HashMap<CounterKey, SequenceCounter>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn find(&self, key: &CounterKey) -> Result<Option<SequenceCounter>, StoreError> {
        let counters = self
            .counters
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(counters.get(key).cloned())
    }

    async fn create(&self, counter: SequenceCounter) -> Result<SequenceCounter, StoreError> {
        let mut counters = self
            .counters
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        if counters.contains_key(&counter.key) {
            return Err(StoreError::Conflict(format!(
                "counter already exists for {} / {} / {}",
                counter.key.company_id, counter.key.kind, counter.key.financial_year
            )));
        }

        counters.insert(counter.key.clone(), counter.clone());
        Ok(counter)
    }

    async fn increment(
        &self,
        key: &CounterKey,
        now: DateTime<Utc>,
    ) -> Result<Option<SequenceCounter>, StoreError> {
        let mut counters = self
            .counters
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let Some(counter) = counters.get_mut(key) else {
            return Ok(None);
        };

        counter.current_number += 1;
        counter.updated_at = now;
        Ok(Some(counter.clone()))
    }

    async fn record_issue(
        &self,
        key: &CounterKey,
        prefix: &str,
        number: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut counters = self
            .counters
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let Some(counter) = counters.get_mut(key) else {
            return Err(StoreError::Backend(format!(
                "no counter for {} / {} / {}",
                key.company_id, key.kind, key.financial_year
            )));
        };

        counter.prefix = prefix.to_string();
        counter.last_generated_number = Some(number.to_string());
        counter.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use billkit_core::{CompanyId, DocumentKind};
    use billkit_numbering::FinancialYear;
    use proptest::prelude::*;

    fn test_key() -> CounterKey {
        CounterKey::new(
            CompanyId::new(),
            DocumentKind::SalesInvoice,
            FinancialYear::starting_in(2024),
        )
    }

    fn fresh_counter(key: CounterKey, first: u64) -> SequenceCounter {
        SequenceCounter::new(key, first, "INV/2024-25/".to_string(), Utc::now())
    }

    #[tokio::test]
    async fn increment_on_missing_key_returns_none() {
        let store = InMemoryCounterStore::new();
        let updated = store.increment(&test_key(), Utc::now()).await.unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn create_then_increment_is_consecutive() {
        let store = InMemoryCounterStore::new();
        let key = test_key();
        store.create(fresh_counter(key.clone(), 1)).await.unwrap();

        for expected in 2..=5u64 {
            let updated = store
                .increment(&key, Utc::now())
                .await
                .unwrap()
                .expect("counter exists");
            assert_eq!(updated.current_number, expected);
        }
    }

    #[tokio::test]
    async fn create_twice_conflicts() {
        let store = InMemoryCounterStore::new();
        let key = test_key();
        store.create(fresh_counter(key.clone(), 1)).await.unwrap();

        let err = store.create(fresh_counter(key, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn record_issue_updates_prefix_and_audit_field() {
        let store = InMemoryCounterStore::new();
        let key = test_key();
        store.create(fresh_counter(key.clone(), 1)).await.unwrap();

        store
            .record_issue(&key, "INV/2024-25/", "INV/2024-25/001", Utc::now())
            .await
            .unwrap();

        let counter = store.find(&key).await.unwrap().unwrap();
        assert_eq!(counter.prefix, "INV/2024-25/");
        assert_eq!(
            counter.last_generated_number.as_deref(),
            Some("INV/2024-25/001")
        );
    }

    #[tokio::test]
    async fn record_issue_on_missing_key_is_backend_error() {
        let store = InMemoryCounterStore::new();
        let err = store
            .record_issue(&test_key(), "INV/2024-25/", "INV/2024-25/001", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_yield_distinct_numbers() {
        let store = Arc::new(InMemoryCounterStore::new());
        let key = test_key();
        store.create(fresh_counter(key.clone(), 1)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                store
                    .increment(&key, Utc::now())
                    .await
                    .unwrap()
                    .unwrap()
                    .current_number
            }));
        }

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap());
        }
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), 32, "every increment must observe a distinct value");
        assert_eq!(numbers.first(), Some(&2));
        assert_eq!(numbers.last(), Some(&33));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: starting from any first number, a run of increments is
        /// gap-free and strictly increasing.
        #[test]
        fn increments_are_gap_free(first in 1u64..10_000, runs in 1usize..50) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            rt.block_on(async {
                let store = InMemoryCounterStore::new();
                let key = test_key();
                store.create(fresh_counter(key.clone(), first)).await.unwrap();

                let mut previous = first;
                for _ in 0..runs {
                    let updated = store
                        .increment(&key, Utc::now())
                        .await
                        .unwrap()
                        .unwrap();
                    assert_eq!(updated.current_number, previous + 1);
                    previous = updated.current_number;
                }
            });
        }
    }
}
