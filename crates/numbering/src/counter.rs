//! Persisted sequence counter, one per company + category + financial year.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billkit_core::{CompanyId, DocumentKind, Entity};

use crate::fiscal::FinancialYear;

/// Composite key of a sequence counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CounterKey {
    pub company_id: CompanyId,
    pub kind: DocumentKind,
    pub financial_year: FinancialYear,
}

impl CounterKey {
    pub fn new(company_id: CompanyId, kind: DocumentKind, financial_year: FinancialYear) -> Self {
        Self {
            company_id,
            kind,
            financial_year,
        }
    }
}

/// Sequence counter record.
///
/// Created lazily on the first allocation for its key, never deleted by the
/// numbering subsystem, and mutated only through the counter store.
/// `current_number` is monotonically increasing within the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceCounter {
    pub key: CounterKey,
    /// Last number handed out (the next allocation observes `+ 1`).
    pub current_number: u64,
    /// Stored formatting prefix, usually embedding the financial year
    /// (e.g. `"INV/2024-25/"`).
    pub prefix: String,
    /// Last formatted document number produced (audit field).
    pub last_generated_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SequenceCounter {
    /// Fresh counter holding its first allocated number.
    pub fn new(key: CounterKey, first_number: u64, prefix: String, now: DateTime<Utc>) -> Self {
        Self {
            key,
            current_number: first_number,
            prefix,
            last_generated_number: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for SequenceCounter {
    type Id = CounterKey;

    fn id(&self) -> &Self::Id {
        &self.key
    }
}
