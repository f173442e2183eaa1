use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// key: invoice-record -> settled billing history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub plan_name: String,
    pub billing_start: DateTime<Utc>,
    pub billing_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Payer identity printed on rendered invoices. Supplied by the caller; this
/// crate does not look it up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingContact {
    pub display_name: String,
    pub email: String,
}
