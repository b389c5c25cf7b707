use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only audit row written with every balance mutation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PointTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub description: String,
    pub balance_after: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Register,
    Consume,
    Redeem,
    Refund,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Register => "register",
            TransactionType::Consume => "consume",
            TransactionType::Redeem => "redeem",
            TransactionType::Refund => "refund",
        }
    }
}

/// Result of an atomic conditional debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    Debited { balance_after: i32 },
    Insufficient { balance: i32 },
    UserNotFound,
}

/// Result of claiming a redemption code and crediting its points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemOutcome {
    Redeemed { points: i32, balance_after: i32 },
    CodeNotFound,
    AlreadyUsed,
    UserNotFound,
}

/// Proof of a successful charge, kept by handlers so a failed generation
/// can be refunded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeReceipt {
    pub user_id: Uuid,
    pub amount: i32,
    pub balance_after: i32,
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub user_id: Option<Uuid>,
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub success: bool,
    pub points: i32,
    pub new_balance: i32,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub points: i32,
    pub transactions: Vec<PointTransaction>,
}
