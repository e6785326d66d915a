//! Borrow/return transaction ledger models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{ConditionStatus, TransactionType};
use super::return_item::ReturnItem;

/// Ledger transaction from database. Append-only once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowingTransaction {
    pub id: i32,
    pub request_id: i32,
    pub transaction_type: TransactionType,
    pub transaction_date: DateTime<Utc>,
    /// Employee who handled the items
    pub processed_by: i32,
    pub notes: Option<String>,
}

/// Transaction with its return lines (empty for borrow transactions)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: BorrowingTransaction,
    pub return_items: Vec<ReturnItem>,
}

/// One line of a borrow payload
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct BorrowLine {
    pub borrowing_item_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Borrow items payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BorrowItems {
    pub employee_id: i32,
    pub notes: Option<String>,
    #[validate(length(min = 1), nested)]
    pub lines: Vec<BorrowLine>,
}

/// One line of a return payload
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReturnLine {
    pub borrowing_item_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub condition_status: ConditionStatus,
    pub notes: Option<String>,
}

/// Return items payload. The transaction type (return vs partial_return)
/// is derived from the resulting balances, never taken from the caller.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReturnItems {
    pub employee_id: i32,
    pub notes: Option<String>,
    #[validate(length(min = 1), nested)]
    pub lines: Vec<ReturnLine>,
}
