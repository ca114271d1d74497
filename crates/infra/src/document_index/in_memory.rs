use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use billkit_core::CompanyId;

use super::{DocumentCollection, DocumentIndex};
use crate::counter_store::StoreError;

/// In-memory document number index.
///
/// Intended for tests/dev. Numbers are registered explicitly; in production
/// the Postgres index reads the live domain tables instead.
#[derive(Debug, Default)]
pub struct InMemoryDocumentIndex {
    numbers: RwLock<HashMap<(CompanyId, DocumentCollection), HashSet<String>>>,
}

impl InMemoryDocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an existing document number for a company + collection.
    pub fn register(
        &self,
        company_id: CompanyId,
        collection: DocumentCollection,
        number: impl Into<String>,
    ) {
        if let Ok(mut numbers) = self.numbers.write() {
            numbers
                .entry((company_id, collection))
                .or_default()
                .insert(number.into());
        }
    }
}

#[async_trait]
impl DocumentIndex for InMemoryDocumentIndex {
    async fn number_exists(
        &self,
        company_id: CompanyId,
        collection: DocumentCollection,
        number: &str,
    ) -> Result<bool, StoreError> {
        let numbers = self
            .numbers
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(numbers
            .get(&(company_id, collection))
            .is_some_and(|set| set.contains(number)))
    }
}
