//! Transaction ledger repository
//!
//! Append-only borrow/return events. The ledger is the sole write path for
//! returns, so the conservation invariant (returned <= borrowed <= approved
//! <= requested) is enforced here, inside one transaction per call with the
//! request row locked.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{RequestStatus, TransactionType},
        request::BorrowingItem,
        return_item::ReturnItem,
        transaction::{BorrowItems, BorrowingTransaction, ReturnItems, TransactionDetail},
    },
};

#[derive(Clone)]
pub struct LedgerRepository {
    pool: Pool<Postgres>,
}

impl LedgerRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Record the borrow transaction for an approved request.
    ///
    /// Each line quantity is capped by the item's approved quantity; the
    /// request activates as part of the same database transaction.
    pub async fn record_borrow(
        &self,
        request_id: i32,
        data: &BorrowItems,
    ) -> AppResult<BorrowingTransaction> {
        let mut tx = self.pool.begin().await?;

        let status = lock_request(&mut tx, request_id).await?;
        if status != RequestStatus::Approved {
            return Err(AppError::InvalidState(format!(
                "Request {} is {}, items can only be borrowed against an approved request",
                request_id, status
            )));
        }

        let items = sqlx::query_as::<_, BorrowingItem>(
            "SELECT * FROM borrowing_items WHERE request_id = $1",
        )
        .bind(request_id)
        .fetch_all(&mut *tx)
        .await?;
        let by_id: HashMap<i32, &BorrowingItem> = items.iter().map(|i| (i.id, i)).collect();

        // Aggregate repeated lines so the per-item total is what gets
        // checked against the approved quantity and written back
        let mut totals: HashMap<i32, i32> = HashMap::new();
        for line in &data.lines {
            let item = by_id.get(&line.borrowing_item_id).ok_or_else(|| {
                AppError::NotFound(format!(
                    "Borrowing item {} does not belong to request {}",
                    line.borrowing_item_id, request_id
                ))
            })?;
            let total = totals.entry(item.id).or_insert(0);
            *total += line.quantity;
            let approved = item.quantity_approved.unwrap_or(0);
            if *total > approved {
                return Err(AppError::QuantityExceedsApproved(format!(
                    "Cannot borrow {} of item {}, only {} approved",
                    *total, item.id, approved
                )));
            }
        }

        let transaction = sqlx::query_as::<_, BorrowingTransaction>(
            r#"
            INSERT INTO borrowing_transactions
                (request_id, transaction_type, transaction_date, processed_by, notes)
            VALUES ($1, 'borrow', $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(Utc::now())
        .bind(data.employee_id)
        .bind(&data.notes)
        .fetch_one(&mut *tx)
        .await?;

        for (item_id, quantity) in &totals {
            sqlx::query("UPDATE borrowing_items SET quantity_borrowed = $1 WHERE id = $2")
                .bind(quantity)
                .bind(item_id)
                .execute(&mut *tx)
                .await?;
        }

        // First borrow activates the request
        sqlx::query("UPDATE borrowing_requests SET status = 'active' WHERE id = $1")
            .bind(request_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(transaction)
    }

    /// Record a return against an active request.
    ///
    /// Fails with OverReturn if any line would push an item's cumulative
    /// returned quantity above its borrowed quantity. The transaction type is
    /// derived: `return` when the call settles every line, else
    /// `partial_return`. One transaction plus all return items commit
    /// atomically.
    pub async fn record_return(
        &self,
        request_id: i32,
        data: &ReturnItems,
    ) -> AppResult<(BorrowingTransaction, Vec<ReturnItem>)> {
        let mut tx = self.pool.begin().await?;

        let status = lock_request(&mut tx, request_id).await?;
        if status != RequestStatus::Active {
            return Err(AppError::InvalidState(format!(
                "Request {} is {}, items can only be returned against an active request",
                request_id, status
            )));
        }

        let items = sqlx::query_as::<_, BorrowingItem>(
            "SELECT * FROM borrowing_items WHERE request_id = $1",
        )
        .bind(request_id)
        .fetch_all(&mut *tx)
        .await?;

        // Cumulative returned per item, before this call
        let mut returned: HashMap<i32, i32> = HashMap::new();
        for item in &items {
            let total: i64 = sqlx::query_scalar(
                "SELECT COALESCE(SUM(quantity_returned), 0) FROM return_items WHERE borrowing_item_id = $1",
            )
            .bind(item.id)
            .fetch_one(&mut *tx)
            .await?;
            returned.insert(item.id, total as i32);
        }

        // Validate conservation, accounting for repeated items within the call
        let mut incoming: HashMap<i32, i32> = HashMap::new();
        for line in &data.lines {
            let item = items
                .iter()
                .find(|i| i.id == line.borrowing_item_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Borrowing item {} does not belong to request {}",
                        line.borrowing_item_id, request_id
                    ))
                })?;
            let borrowed = item.quantity_borrowed.unwrap_or(0);
            let already = returned.get(&item.id).copied().unwrap_or(0);
            let pending = incoming.entry(item.id).or_insert(0);
            if already + *pending + line.quantity > borrowed {
                return Err(AppError::OverReturn(format!(
                    "Returning {} of item {} exceeds borrowed quantity {} ({} already returned)",
                    line.quantity, item.id, borrowed, already
                )));
            }
            *pending += line.quantity;
        }

        let fully_settled = items.iter().all(|item| {
            let borrowed = item.quantity_borrowed.unwrap_or(0);
            let already = returned.get(&item.id).copied().unwrap_or(0);
            let added = incoming.get(&item.id).copied().unwrap_or(0);
            already + added >= borrowed
        });
        let transaction_type = TransactionType::for_return(fully_settled);

        let now = Utc::now();
        let transaction = sqlx::query_as::<_, BorrowingTransaction>(
            r#"
            INSERT INTO borrowing_transactions
                (request_id, transaction_type, transaction_date, processed_by, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(transaction_type)
        .bind(now)
        .bind(data.employee_id)
        .bind(&data.notes)
        .fetch_one(&mut *tx)
        .await?;

        let mut return_items = Vec::with_capacity(data.lines.len());
        for line in &data.lines {
            let return_item = sqlx::query_as::<_, ReturnItem>(
                r#"
                INSERT INTO return_items
                    (transaction_id, borrowing_item_id, quantity_returned,
                     condition_status, damage_notes, return_date)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(transaction.id)
            .bind(line.borrowing_item_id)
            .bind(line.quantity)
            .bind(line.condition_status)
            .bind(&line.notes)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
            return_items.push(return_item);
        }

        tx.commit().await?;
        Ok((transaction, return_items))
    }

    /// Ledger history for a request, newest first, with return lines
    pub async fn list_for_request(&self, request_id: i32) -> AppResult<Vec<TransactionDetail>> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM borrowing_requests WHERE id = $1)")
                .bind(request_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Request {} not found", request_id)));
        }
        fetch_transaction_details(&self.pool, request_id).await
    }
}

/// Lock a request row for the duration of the enclosing transaction and
/// return its stored status.
async fn lock_request(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    request_id: i32,
) -> AppResult<RequestStatus> {
    sqlx::query_scalar::<_, RequestStatus>(
        "SELECT status FROM borrowing_requests WHERE id = $1 FOR UPDATE",
    )
    .bind(request_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Request {} not found", request_id)))
}

/// Transactions with their return lines for a request
pub(crate) async fn fetch_transaction_details(
    pool: &Pool<Postgres>,
    request_id: i32,
) -> AppResult<Vec<TransactionDetail>> {
    let transactions = sqlx::query_as::<_, BorrowingTransaction>(
        "SELECT * FROM borrowing_transactions WHERE request_id = $1 ORDER BY transaction_date DESC, id DESC",
    )
    .bind(request_id)
    .fetch_all(pool)
    .await?;

    let mut details = Vec::with_capacity(transactions.len());
    for transaction in transactions {
        let return_items = sqlx::query_as::<_, ReturnItem>(
            "SELECT * FROM return_items WHERE transaction_id = $1 ORDER BY id",
        )
        .bind(transaction.id)
        .fetch_all(pool)
        .await?;
        details.push(TransactionDetail {
            transaction,
            return_items,
        });
    }
    Ok(details)
}
