//! Read-only lookups into the domain document collections.
//!
//! Used by the allocator's uniqueness check: "does any existing document of
//! this collection already carry this number for this company?".

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryDocumentIndex;
pub use postgres::PostgresDocumentIndex;

use async_trait::async_trait;
use std::sync::Arc;

use billkit_core::{CompanyId, DocumentKind};

use crate::counter_store::StoreError;

/// Domain collection a document number can collide within.
///
/// Only the four collections below are verifiable; every other document
/// category has no backing collection and its numbers go unchecked.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DocumentCollection {
    SalesInvoices,
    PurchaseInvoices,
    SaleOrders,
    PurchaseOrders,
}

impl DocumentCollection {
    /// Collection a document category is numbered against, if any.
    pub fn for_kind(kind: &DocumentKind) -> Option<Self> {
        match kind {
            DocumentKind::SalesInvoice => Some(Self::SalesInvoices),
            DocumentKind::PurchaseInvoice => Some(Self::PurchaseInvoices),
            DocumentKind::SaleOrder => Some(Self::SaleOrders),
            DocumentKind::PurchaseOrder => Some(Self::PurchaseOrders),
            _ => None,
        }
    }

    /// Backing table name (Postgres).
    pub fn table(&self) -> &'static str {
        match self {
            Self::SalesInvoices => "sales_invoices",
            Self::PurchaseInvoices => "purchase_invoices",
            Self::SaleOrders => "sale_orders",
            Self::PurchaseOrders => "purchase_orders",
        }
    }

    /// Column holding the document number in the backing table.
    pub fn number_column(&self) -> &'static str {
        match self {
            Self::SalesInvoices => "invoice_number",
            Self::PurchaseInvoices => "bill_number",
            Self::SaleOrders => "order_number",
            Self::PurchaseOrders => "po_number",
        }
    }
}

/// Company-scoped membership test against a domain collection.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    async fn number_exists(
        &self,
        company_id: CompanyId,
        collection: DocumentCollection,
        number: &str,
    ) -> Result<bool, StoreError>;
}

#[async_trait]
impl<D> DocumentIndex for Arc<D>
where
    D: DocumentIndex + ?Sized,
{
    async fn number_exists(
        &self,
        company_id: CompanyId,
        collection: DocumentCollection,
        number: &str,
    ) -> Result<bool, StoreError> {
        (**self).number_exists(company_id, collection, number).await
    }
}
