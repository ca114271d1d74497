//! Postgres-backed document number index.
//!
//! Queries the live domain tables (`sales_invoices`, `purchase_invoices`,
//! `sale_orders`, `purchase_orders`), each of which carries a `company_id`
//! column and its collection's number column.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::instrument;

use billkit_core::CompanyId;

use super::{DocumentCollection, DocumentIndex};
use crate::counter_store::StoreError;

#[derive(Debug, Clone)]
pub struct PostgresDocumentIndex {
    pool: Arc<PgPool>,
}

impl PostgresDocumentIndex {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl DocumentIndex for PostgresDocumentIndex {
    #[instrument(
        skip(self, number),
        fields(company_id = %company_id, collection = ?collection),
        err
    )]
    async fn number_exists(
        &self,
        company_id: CompanyId,
        collection: DocumentCollection,
        number: &str,
    ) -> Result<bool, StoreError> {
        // Table and column names come from the static DocumentCollection
        // mapping, never from caller input.
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE company_id = $1 AND {} = $2)",
            collection.table(),
            collection.number_column(),
        );

        sqlx::query_scalar::<_, bool>(&sql)
            .bind(company_id.as_uuid())
            .bind(number)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("number_exists: {e}")))
    }
}
