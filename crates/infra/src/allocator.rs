//! Document number allocation service (application-level orchestration).
//!
//! `SequenceAllocator` composes the counter store and the document index to
//! hand out formatted document numbers:
//!
//! ```text
//! allocate(company, kind, settings, now)
//!   ↓
//! 1. Financial year from `now` (April–March calendar)
//!   ↓
//! 2. Resolve prefix (settings override → category default)
//!   ↓
//! 3. Atomic increment of the counter (create lazily on first allocation)
//!   ↓
//! 4. Format: {prefix}/{financial_year}/{zero-padded counter}
//!   ↓
//! 5. Record the issued number back on the counter
//! ```
//!
//! Two entry points cover the two caller postures:
//!
//! - [`SequenceAllocator::try_allocate`] returns a typed outcome so callers
//!   can distinguish "fix your input" (`MissingCompany`) from "retry later"
//!   (`Storage`).
//! - [`SequenceAllocator::allocate`] is the best-effort path: it always
//!   returns a usable string, degrading to a timestamp-based fallback number
//!   when allocation cannot complete. Fallback-shaped numbers
//!   (`"{SHORT_CODE}-{epoch_millis}"`) are provisional and must be
//!   reconciled by the caller.
//!
//! This module contains no IO itself; it composes the store traits.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{instrument, warn};

use billkit_core::{CompanyId, DocumentKind};
use billkit_numbering::{
    CounterKey, FinancialYear, NumberingSettings, SequenceCounter, fallback_number,
    format_padded, prefix_with_year,
};

use crate::counter_store::{CounterStore, StoreError};
use crate::document_index::{DocumentCollection, DocumentIndex};

/// Allocation failure, split by what the caller should do about it.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// No company to scope a counter to; the caller must fix its input.
    #[error("company id is required for sequence allocation")]
    MissingCompany,

    /// Transient storage failure; retry-worthy.
    #[error("sequence storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// A successfully allocated document number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedNumber {
    /// Formatted number, e.g. `"INV/2024-25/001"`.
    pub number: String,
    /// The raw counter value behind the number.
    pub sequence: u64,
    /// Financial year the number was allocated in.
    pub financial_year: FinancialYear,
}

/// Sequence allocation service.
#[derive(Debug)]
pub struct SequenceAllocator<S, D> {
    counters: S,
    documents: D,
}

impl<S, D> SequenceAllocator<S, D>
where
    S: CounterStore,
    D: DocumentIndex,
{
    pub fn new(counters: S, documents: D) -> Self {
        Self { counters, documents }
    }

    /// Next number the counter would hand out, without consuming it.
    ///
    /// Advisory only: concurrent allocations can make the answer stale the
    /// moment it is returned. Never errors; a storage failure is logged and
    /// reported as 1.
    #[instrument(skip(self), fields(company_id = %company_id, kind = %kind))]
    pub async fn peek_next_number(
        &self,
        company_id: CompanyId,
        kind: &DocumentKind,
        now: DateTime<Utc>,
    ) -> u64 {
        let key = CounterKey::new(
            company_id,
            kind.clone(),
            FinancialYear::from_date(now.date_naive()),
        );
        match self.counters.find(&key).await {
            Ok(Some(counter)) => counter.current_number + 1,
            Ok(None) => 1,
            Err(err) => {
                warn!(error = %err, "peek failed, reporting first number");
                1
            }
        }
    }

    /// Allocate the next document number, returning a typed outcome.
    ///
    /// The counter increment is a single atomic store operation, so two
    /// concurrent allocations for the same (company, kind, financial year)
    /// always observe distinct, consecutive values. A counter is created
    /// lazily on the first allocation for its key; when a concurrent first
    /// allocation wins that race, the losing call recovers by incrementing
    /// the freshly created counter.
    #[instrument(
        skip(self, settings),
        fields(company_id = ?company_id, kind = %kind),
        err
    )]
    pub async fn try_allocate(
        &self,
        company_id: Option<CompanyId>,
        kind: &DocumentKind,
        settings: &NumberingSettings,
        now: DateTime<Utc>,
    ) -> Result<AllocatedNumber, AllocationError> {
        let company_id = company_id.ok_or(AllocationError::MissingCompany)?;

        let financial_year = FinancialYear::from_date(now.date_naive());
        let prefix = settings.resolve_prefix(kind, &financial_year);
        let key = CounterKey::new(company_id, kind.clone(), financial_year);

        let counter = match self.counters.increment(&key, now).await? {
            Some(counter) => counter,
            None => self.create_counter(&key, &prefix, settings, now).await?,
        };

        let padded = format_padded(counter.current_number, settings.padding());

        // The stored prefix survives settings changes within a year unless
        // the newly resolved prefix is no longer part of it.
        let mut final_prefix = counter.prefix.clone();
        if !prefix.is_empty() && !final_prefix.contains(&prefix) {
            final_prefix = prefix_with_year(&prefix, &key.financial_year);
        }

        let number = format!("{final_prefix}{padded}");
        self.counters
            .record_issue(&key, &final_prefix, &number, now)
            .await?;

        Ok(AllocatedNumber {
            number,
            sequence: counter.current_number,
            financial_year: key.financial_year,
        })
    }

    /// Allocate the next document number, degrading to a fallback string.
    ///
    /// Preserves the "always returns a string" contract of the settings
    /// dialogs and document forms: a missing company or a storage failure
    /// yields `"{SHORT_CODE}-{epoch_millis}"` instead of an error. Missing
    /// company never touches storage.
    pub async fn allocate(
        &self,
        company_id: Option<CompanyId>,
        kind: &DocumentKind,
        settings: &NumberingSettings,
        now: DateTime<Utc>,
    ) -> String {
        match self.try_allocate(company_id, kind, settings, now).await {
            Ok(allocated) => allocated.number,
            Err(err) => {
                let number = fallback_number(kind, now);
                warn!(
                    error = %err,
                    kind = %kind,
                    fallback = %number,
                    "allocation degraded to fallback number"
                );
                number
            }
        }
    }

    /// Whether no existing document of this category already carries the
    /// candidate number.
    ///
    /// Categories without a backing collection return `true` unconditionally
    /// (no verification performed). A storage failure fails closed: the
    /// number is reported as not unique.
    #[instrument(skip(self, candidate), fields(company_id = %company_id, kind = %kind))]
    pub async fn is_number_unique(
        &self,
        company_id: CompanyId,
        kind: &DocumentKind,
        candidate: &str,
    ) -> bool {
        let Some(collection) = DocumentCollection::for_kind(kind) else {
            return true;
        };

        match self
            .documents
            .number_exists(company_id, collection, candidate)
            .await
        {
            Ok(exists) => !exists,
            Err(err) => {
                warn!(error = %err, "uniqueness check failed, failing closed");
                false
            }
        }
    }

    async fn create_counter(
        &self,
        key: &CounterKey,
        prefix: &str,
        settings: &NumberingSettings,
        now: DateTime<Utc>,
    ) -> Result<SequenceCounter, StoreError> {
        let fresh = SequenceCounter::new(
            key.clone(),
            settings.start_number(),
            prefix_with_year(prefix, &key.financial_year),
            now,
        );
        match self.counters.create(fresh).await {
            Ok(counter) => Ok(counter),
            // Concurrent first allocation won; take the next value instead.
            Err(StoreError::Conflict(_)) => {
                self.counters.increment(key, now).await?.ok_or_else(|| {
                    StoreError::Backend("counter vanished after create conflict".to_string())
                })
            }
            Err(err) => Err(err),
        }
    }
}
