use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PaymentFilter {
    pub number: Option<u32>,
}

/// A payment round. The number doubles as display label and as
/// the join key for ledger entries.
#[derive(Debug, Default, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub number: u32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PaymentEntryFilter {
    pub payment_number: Option<u32>,
    pub member_id: Option<String>,
}

/// One member's contribution to one payment round.
#[derive(Debug, Default, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub payment_number: u32,
    pub member_id: String,
    pub paid_on: NaiveDate,
    pub place: String,
    pub method: String,
    pub receipt_no: String,
    pub remark: String,
}
