//! Document categories that receive sequence numbers.

use serde::{Deserialize, Serialize};

/// Category of a numbered business document.
///
/// The known categories carry their default numbering prefix. Categories the
/// application does not know about travel as `Other(tag)` so integrations can
/// number their own document types; those fall back to a prefix derived from
/// the tag itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentKind {
    SalesInvoice,
    PurchaseInvoice,
    CreditNote,
    SaleOrder,
    PurchaseOrder,
    Estimate,
    Proforma,
    DeliveryChallan,
    SaleReturn,
    PurchaseReturn,
    /// Caller-supplied category tag, snake_case by convention.
    Other(String),
}

impl DocumentKind {
    /// Canonical snake_case tag (the persisted string form).
    pub fn tag(&self) -> &str {
        match self {
            DocumentKind::SalesInvoice => "sales_invoice",
            DocumentKind::PurchaseInvoice => "purchase_invoice",
            DocumentKind::CreditNote => "credit_note",
            DocumentKind::SaleOrder => "sale_order",
            DocumentKind::PurchaseOrder => "purchase_order",
            DocumentKind::Estimate => "estimate",
            DocumentKind::Proforma => "proforma",
            DocumentKind::DeliveryChallan => "delivery_challan",
            DocumentKind::SaleReturn => "sale_return",
            DocumentKind::PurchaseReturn => "purchase_return",
            DocumentKind::Other(tag) => tag,
        }
    }

    /// Default numbering prefix for the category.
    ///
    /// Unknown categories have no configured prefix and use [`short_code`]
    /// instead.
    ///
    /// [`short_code`]: DocumentKind::short_code
    pub fn default_prefix(&self) -> String {
        match self {
            DocumentKind::SalesInvoice => "INV".to_string(),
            DocumentKind::PurchaseInvoice => "BILL".to_string(),
            DocumentKind::CreditNote => "CN".to_string(),
            DocumentKind::SaleOrder => "SO".to_string(),
            DocumentKind::PurchaseOrder => "PO".to_string(),
            DocumentKind::Estimate => "EST".to_string(),
            DocumentKind::Proforma => "PI".to_string(),
            DocumentKind::DeliveryChallan => "DC".to_string(),
            DocumentKind::SaleReturn => "SR".to_string(),
            DocumentKind::PurchaseReturn => "PR".to_string(),
            DocumentKind::Other(_) => self.short_code(),
        }
    }

    /// First three characters of the tag, uppercased.
    ///
    /// Used for fallback document numbers and as the prefix of unknown
    /// categories.
    pub fn short_code(&self) -> String {
        self.tag().chars().take(3).collect::<String>().to_uppercase()
    }
}

impl crate::ValueObject for DocumentKind {}

impl core::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.tag())
    }
}

impl From<&str> for DocumentKind {
    fn from(tag: &str) -> Self {
        match tag {
            "sales_invoice" => DocumentKind::SalesInvoice,
            "purchase_invoice" => DocumentKind::PurchaseInvoice,
            "credit_note" => DocumentKind::CreditNote,
            "sale_order" => DocumentKind::SaleOrder,
            "purchase_order" => DocumentKind::PurchaseOrder,
            "estimate" => DocumentKind::Estimate,
            "proforma" => DocumentKind::Proforma,
            "delivery_challan" => DocumentKind::DeliveryChallan,
            "sale_return" => DocumentKind::SaleReturn,
            "purchase_return" => DocumentKind::PurchaseReturn,
            other => DocumentKind::Other(other.to_string()),
        }
    }
}

impl From<String> for DocumentKind {
    fn from(tag: String) -> Self {
        DocumentKind::from(tag.as_str())
    }
}

impl From<DocumentKind> for String {
    fn from(kind: DocumentKind) -> Self {
        kind.tag().to_string()
    }
}
