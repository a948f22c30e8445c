use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A customer wallet. Balance is kept in integer cents so conditional
/// debits stay exact.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WalletAccount {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub account_id: String,
    pub balance_cents: i64,
    pub currency: String,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryKind {
    Recharge,
    Debit,
    Refund,
}

/// Append-only movement on a wallet. The balance on the account document is
/// authoritative; entries exist for auditing and reconciliation.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LedgerEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub account_id: String,
    pub amount_cents: i64,
    pub kind: LedgerEntryKind,
    pub reference: String,
    pub created_at: Option<DateTime>,
}
