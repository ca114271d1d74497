//! Numbering configuration (a view of the application settings record).

use serde::{Deserialize, Serialize};

use billkit_core::DocumentKind;

use crate::fiscal::FinancialYear;

/// Numbering options carried on the application settings record.
///
/// Every field is optional; absent fields fall back to the documented
/// defaults so a brand-new installation numbers documents sensibly without
/// any configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberingSettings {
    pub sale_prefix: Option<String>,
    pub purchase_prefix: Option<String>,
    pub credit_note_prefix: Option<String>,
    pub sale_order_prefix: Option<String>,
    pub purchase_order_prefix: Option<String>,
    pub estimate_prefix: Option<String>,
    pub proforma_prefix: Option<String>,
    pub challan_prefix: Option<String>,
    pub sale_return_prefix: Option<String>,
    pub purchase_return_prefix: Option<String>,

    /// First number handed out for a fresh counter. Default 1.
    pub invoice_start_number: Option<u64>,
    /// Zero-padding width of the counter part. Default 3.
    pub invoice_padding: Option<usize>,
}

impl NumberingSettings {
    pub fn start_number(&self) -> u64 {
        self.invoice_start_number.unwrap_or(1)
    }

    pub fn padding(&self) -> usize {
        self.invoice_padding.unwrap_or(3)
    }

    /// Configured prefix override for a document category, if any.
    ///
    /// Unknown (`Other`) categories have no settings field and always use
    /// their derived prefix.
    pub fn prefix_override(&self, kind: &DocumentKind) -> Option<&str> {
        match kind {
            DocumentKind::SalesInvoice => self.sale_prefix.as_deref(),
            DocumentKind::PurchaseInvoice => self.purchase_prefix.as_deref(),
            DocumentKind::CreditNote => self.credit_note_prefix.as_deref(),
            DocumentKind::SaleOrder => self.sale_order_prefix.as_deref(),
            DocumentKind::PurchaseOrder => self.purchase_order_prefix.as_deref(),
            DocumentKind::Estimate => self.estimate_prefix.as_deref(),
            DocumentKind::Proforma => self.proforma_prefix.as_deref(),
            DocumentKind::DeliveryChallan => self.challan_prefix.as_deref(),
            DocumentKind::SaleReturn => self.sale_return_prefix.as_deref(),
            DocumentKind::PurchaseReturn => self.purchase_return_prefix.as_deref(),
            DocumentKind::Other(_) => None,
        }
    }

    /// Resolve the effective prefix for a category.
    ///
    /// The override wins over the category default. The sentinel `"none"`,
    /// the empty string, and a prefix equal to the financial-year label all
    /// resolve to the empty prefix (year-only numbering; the year must not
    /// appear twice in the formatted number).
    pub fn resolve_prefix(&self, kind: &DocumentKind, year: &FinancialYear) -> String {
        let raw = self
            .prefix_override(kind)
            .map(str::to_owned)
            .unwrap_or_else(|| kind.default_prefix());
        if raw.is_empty() || raw == "none" || raw == year.label() {
            String::new()
        } else {
            raw
        }
    }
}
