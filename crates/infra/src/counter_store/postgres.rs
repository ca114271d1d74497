//! Postgres-backed sequence counter store.
//!
//! Persists counters in the `invoice_sequences` table, one row per
//! (company, document category, financial year), and makes the
//! increment-and-fetch step a single `UPDATE … RETURNING` statement so the
//! monotonicity guarantee is enforced at the database level.
//!
//! ## Expected Schema
//!
//! ```sql
//! CREATE TABLE invoice_sequences (
//!     company_id            UUID        NOT NULL,
//!     transaction_type      TEXT        NOT NULL,
//!     financial_year        TEXT        NOT NULL,
//!     current_number        BIGINT      NOT NULL CHECK (current_number > 0),
//!     prefix                TEXT        NOT NULL,
//!     last_generated_number TEXT,
//!     created_at            TIMESTAMPTZ NOT NULL,
//!     updated_at            TIMESTAMPTZ NOT NULL,
//!     PRIMARY KEY (company_id, transaction_type, financial_year)
//! );
//! ```
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Concurrent first allocation created the row |
//! | Database (other) | Any other | `Backend` | Constraint/database errors |
//! | PoolClosed, RowNotFound, Other | N/A | `Backend` | Connection/network failures |
//!
//! ## Thread Safety
//!
//! `PostgresCounterStore` is `Send + Sync` and can be shared across threads.
//! All operations use the SQLx connection pool which handles thread-safe
//! connection management.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::instrument;

use billkit_numbering::{CounterKey, SequenceCounter};

use super::r#trait::{CounterStore, StoreError};

/// Postgres-backed counter store.
///
/// The atomicity of `increment` rests on a single `UPDATE invoice_sequences
/// SET current_number = current_number + 1 … RETURNING` statement: Postgres
/// row-locks the counter for the duration of the statement, so two
/// concurrent allocations for the same key serialize and observe distinct
/// values. No explicit transaction is needed for a single statement.
#[derive(Debug, Clone)]
pub struct PostgresCounterStore {
    pool: Arc<PgPool>,
}

impl PostgresCounterStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl CounterStore for PostgresCounterStore {
    #[instrument(
        skip(self),
        fields(
            company_id = %key.company_id,
            kind = %key.kind,
            financial_year = %key.financial_year
        ),
        err
    )]
    async fn find(&self, key: &CounterKey) -> Result<Option<SequenceCounter>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                company_id,
                transaction_type,
                financial_year,
                current_number,
                prefix,
                last_generated_number,
                created_at,
                updated_at
            FROM invoice_sequences
            WHERE company_id = $1 AND transaction_type = $2 AND financial_year = $3
            "#,
        )
        .bind(key.company_id.as_uuid())
        .bind(key.kind.tag())
        .bind(key.financial_year.label())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find", e))?;

        row.map(counter_from_row).transpose()
    }

    #[instrument(
        skip(self, counter),
        fields(
            company_id = %counter.key.company_id,
            kind = %counter.key.kind,
            financial_year = %counter.key.financial_year,
            first_number = counter.current_number
        ),
        err
    )]
    async fn create(&self, counter: SequenceCounter) -> Result<SequenceCounter, StoreError> {
        let current = i64::try_from(counter.current_number)
            .map_err(|_| StoreError::Backend("counter value exceeds BIGINT range".to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO invoice_sequences (
                company_id,
                transaction_type,
                financial_year,
                current_number,
                prefix,
                last_generated_number,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(counter.key.company_id.as_uuid())
        .bind(counter.key.kind.tag())
        .bind(counter.key.financial_year.label())
        .bind(current)
        .bind(&counter.prefix)
        .bind(&counter.last_generated_number)
        .bind(counter.created_at)
        .bind(counter.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create", e))?;

        Ok(counter)
    }

    #[instrument(
        skip(self),
        fields(
            company_id = %key.company_id,
            kind = %key.kind,
            financial_year = %key.financial_year
        ),
        err
    )]
    async fn increment(
        &self,
        key: &CounterKey,
        now: DateTime<Utc>,
    ) -> Result<Option<SequenceCounter>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE invoice_sequences
            SET current_number = current_number + 1,
                updated_at = $4
            WHERE company_id = $1 AND transaction_type = $2 AND financial_year = $3
            RETURNING
                company_id,
                transaction_type,
                financial_year,
                current_number,
                prefix,
                last_generated_number,
                created_at,
                updated_at
            "#,
        )
        .bind(key.company_id.as_uuid())
        .bind(key.kind.tag())
        .bind(key.financial_year.label())
        .bind(now)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("increment", e))?;

        row.map(counter_from_row).transpose()
    }

    #[instrument(
        skip(self, prefix, number),
        fields(
            company_id = %key.company_id,
            kind = %key.kind,
            financial_year = %key.financial_year
        ),
        err
    )]
    async fn record_issue(
        &self,
        key: &CounterKey,
        prefix: &str,
        number: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE invoice_sequences
            SET prefix = $4,
                last_generated_number = $5,
                updated_at = $6
            WHERE company_id = $1 AND transaction_type = $2 AND financial_year = $3
            "#,
        )
        .bind(key.company_id.as_uuid())
        .bind(key.kind.tag())
        .bind(key.financial_year.label())
        .bind(prefix)
        .bind(number)
        .bind(now)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("record_issue", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Backend(format!(
                "no counter row for {} / {} / {}",
                key.company_id, key.kind, key.financial_year
            )));
        }
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // Unique violation: concurrent creation of the same counter.
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}

fn counter_from_row(row: sqlx::postgres::PgRow) -> Result<SequenceCounter, StoreError> {
    let company_id: uuid::Uuid = get(&row, "company_id")?;
    let transaction_type: String = get(&row, "transaction_type")?;
    let financial_year: String = get(&row, "financial_year")?;
    let current_number: i64 = get(&row, "current_number")?;
    let prefix: String = get(&row, "prefix")?;
    let last_generated_number: Option<String> = get(&row, "last_generated_number")?;
    let created_at: DateTime<Utc> = get(&row, "created_at")?;
    let updated_at: DateTime<Utc> = get(&row, "updated_at")?;

    let financial_year = financial_year
        .parse()
        .map_err(|e| StoreError::Backend(format!("bad financial_year in row: {e}")))?;
    let current_number = u64::try_from(current_number)
        .map_err(|_| StoreError::Backend("negative current_number in row".to_string()))?;

    Ok(SequenceCounter {
        key: CounterKey::new(
            company_id.into(),
            transaction_type.into(),
            financial_year,
        ),
        current_number,
        prefix,
        last_generated_number,
        created_at,
        updated_at,
    })
}

fn get<'r, T>(row: &'r sqlx::postgres::PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Backend(format!("failed to decode column {column}: {e}")))
}
