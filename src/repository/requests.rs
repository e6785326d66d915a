//! Borrowing request aggregate repository
//!
//! Owns the request state machine. Every mutation locks the request row
//! (`SELECT ... FOR UPDATE`) before validating, so operations on one request
//! are serialized while different requests proceed independently.

use chrono::Utc;
use sqlx::{FromRow, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RequestStatus,
        request::{
            BorrowingItem, BorrowingRequest, ItemApproval, ItemBalance, RequestDetail,
            RequestQuery, RequestSummary, SubmitRequest,
        },
    },
};

/// Filter selecting requests with at least one item still out.
/// `r` must alias the borrowing_requests table in the enclosing query.
const HAS_OUTSTANDING_SQL: &str = r#"EXISTS (
    SELECT 1 FROM borrowing_items bi
    WHERE bi.request_id = r.id
      AND COALESCE(bi.quantity_borrowed, 0) > COALESCE((
          SELECT SUM(ri.quantity_returned) FROM return_items ri
          WHERE ri.borrowing_item_id = bi.id), 0)
)"#;

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowingRequest> {
        sqlx::query_as::<_, BorrowingRequest>("SELECT * FROM borrowing_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    /// Get line items for a request
    pub async fn get_items(&self, request_id: i32) -> AppResult<Vec<BorrowingItem>> {
        let items = sqlx::query_as::<_, BorrowingItem>(
            "SELECT * FROM borrowing_items WHERE request_id = $1 ORDER BY id",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Create a request with its line items (status pending)
    pub async fn create(&self, data: &SubmitRequest) -> AppResult<BorrowingRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowingRequest>(
            r#"
            INSERT INTO borrowing_requests
                (customer_id, employee_id, location_id, purpose, notes,
                 request_date, required_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING *
            "#,
        )
        .bind(data.customer_id)
        .bind(data.employee_id)
        .bind(data.location_id)
        .bind(&data.purpose)
        .bind(&data.notes)
        .bind(Utc::now())
        .bind(data.required_date)
        .fetch_one(&mut *tx)
        .await?;

        for item in &data.items {
            sqlx::query(
                r#"
                INSERT INTO borrowing_items
                    (request_id, item_type_id, item_description,
                     quantity_requested, estimated_value)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(request.id)
            .bind(item.item_type_id)
            .bind(&item.item_description)
            .bind(item.quantity_requested)
            .bind(item.estimated_value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(request)
    }

    /// Approve a pending request, setting per-item approved quantities.
    ///
    /// Items not named in `approvals` default to their requested quantity.
    /// Approving above the requested quantity is rejected.
    pub async fn approve(
        &self,
        request_id: i32,
        admin_id: i32,
        approvals: &[ItemApproval],
    ) -> AppResult<BorrowingRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowingRequest>(
            "SELECT * FROM borrowing_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request {} not found", request_id)))?;

        if !request.status.can_transition_to(RequestStatus::Approved) {
            return Err(AppError::InvalidState(format!(
                "Request {} is {}, only pending requests can be approved",
                request_id, request.status
            )));
        }

        let items = sqlx::query_as::<_, BorrowingItem>(
            "SELECT * FROM borrowing_items WHERE request_id = $1 ORDER BY id",
        )
        .bind(request_id)
        .fetch_all(&mut *tx)
        .await?;

        for approval in approvals {
            let item = items
                .iter()
                .find(|i| i.id == approval.borrowing_item_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Borrowing item {} does not belong to request {}",
                        approval.borrowing_item_id, request_id
                    ))
                })?;
            if approval.quantity_approved > item.quantity_requested {
                return Err(AppError::Validation(format!(
                    "Approved quantity {} exceeds requested quantity {} for item {}",
                    approval.quantity_approved, item.quantity_requested, item.id
                )));
            }
        }

        for item in &items {
            let quantity = approvals
                .iter()
                .find(|a| a.borrowing_item_id == item.id)
                .map(|a| a.quantity_approved)
                .unwrap_or(item.quantity_requested);

            sqlx::query("UPDATE borrowing_items SET quantity_approved = $1 WHERE id = $2")
                .bind(quantity)
                .bind(item.id)
                .execute(&mut *tx)
                .await?;
        }

        let updated = sqlx::query_as::<_, BorrowingRequest>(
            r#"
            UPDATE borrowing_requests
            SET status = 'approved', approved_by = $1, approved_date = $2
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(admin_id)
        .bind(Utc::now())
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Reject a pending request, recording the reason in the notes
    pub async fn reject(
        &self,
        request_id: i32,
        admin_id: i32,
        reason: Option<&str>,
    ) -> AppResult<BorrowingRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowingRequest>(
            "SELECT * FROM borrowing_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request {} not found", request_id)))?;

        if !request.status.can_transition_to(RequestStatus::Rejected) {
            return Err(AppError::InvalidState(format!(
                "Request {} is {}, only pending requests can be rejected",
                request_id, request.status
            )));
        }

        let notes = match (request.notes.as_deref(), reason) {
            (Some(existing), Some(r)) => Some(format!("{}\nRejected: {}", existing, r)),
            (None, Some(r)) => Some(format!("Rejected: {}", r)),
            (existing, None) => existing.map(str::to_string),
        };

        let updated = sqlx::query_as::<_, BorrowingRequest>(
            r#"
            UPDATE borrowing_requests
            SET status = 'rejected', approved_by = $1, approved_date = $2, notes = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(admin_id)
        .bind(Utc::now())
        .bind(notes)
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Close an active request. Every line item must be fully returned.
    pub async fn close(&self, request_id: i32) -> AppResult<BorrowingRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowingRequest>(
            "SELECT * FROM borrowing_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request {} not found", request_id)))?;

        if !request.status.can_transition_to(RequestStatus::Returned) {
            return Err(AppError::InvalidState(format!(
                "Request {} is {}, only active requests can be closed",
                request_id, request.status
            )));
        }

        let outstanding: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(
                COALESCE(bi.quantity_borrowed, 0) - COALESCE((
                    SELECT SUM(ri.quantity_returned) FROM return_items ri
                    WHERE ri.borrowing_item_id = bi.id), 0)
            ), 0)
            FROM borrowing_items bi
            WHERE bi.request_id = $1
            "#,
        )
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        if outstanding > 0 {
            return Err(AppError::OutstandingBalance(format!(
                "Request {} still has {} item(s) out",
                request_id, outstanding
            )));
        }

        let updated = sqlx::query_as::<_, BorrowingRequest>(
            "UPDATE borrowing_requests SET status = 'returned' WHERE id = $1 RETURNING *",
        )
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a request that has no ledger history (cascades to line items)
    pub async fn delete(&self, request_id: i32) -> AppResult<()> {
        let has_transactions: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrowing_transactions WHERE request_id = $1)",
        )
        .bind(request_id)
        .fetch_one(&self.pool)
        .await?;

        if has_transactions {
            return Err(AppError::Conflict(format!(
                "Request {} has transactions and cannot be deleted",
                request_id
            )));
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM borrowing_items WHERE request_id = $1")
            .bind(request_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM borrowing_requests WHERE id = $1")
            .bind(request_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Request {} not found", request_id)));
        }
        tx.commit().await?;
        Ok(())
    }

    /// List requests with status/customer filters and pagination
    pub async fn list(&self, query: &RequestQuery) -> AppResult<(Vec<RequestSummary>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(25).clamp(1, 100);

        let mut conditions: Vec<String> = Vec::new();
        if let Some(raw) = query.status.as_deref() {
            let status = raw.parse::<RequestStatus>().map_err(AppError::Validation)?;
            if status == RequestStatus::Overdue {
                conditions.push(format!(
                    "r.status = 'active' AND r.required_date < NOW() AND {}",
                    HAS_OUTSTANDING_SQL
                ));
            } else {
                // as_str yields a fixed literal, never caller input
                conditions.push(format!("r.status = '{}'", status.as_str()));
            }
        }
        if query.customer_id.is_some() {
            conditions.push("r.customer_id = $1".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            r#"
            SELECT r.*, ({has_outstanding}) AS has_outstanding
            FROM borrowing_requests r
            {where_clause}
            ORDER BY r.request_date DESC, r.id DESC
            LIMIT {limit} OFFSET {offset}
            "#,
            has_outstanding = HAS_OUTSTANDING_SQL,
            where_clause = where_clause,
            limit = per_page,
            offset = (page - 1) * per_page,
        );
        let count_sql = format!(
            "SELECT COUNT(*) FROM borrowing_requests r {}",
            where_clause
        );

        let mut rows_query = sqlx::query(&sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(customer_id) = query.customer_id {
            rows_query = rows_query.bind(customer_id);
            count_query = count_query.bind(customer_id);
        }

        let rows = rows_query.fetch_all(&self.pool).await?;
        let total = count_query.fetch_one(&self.pool).await?;

        let now = Utc::now();
        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let request = BorrowingRequest::from_row(&row)?;
            let has_outstanding: bool = row.get("has_outstanding");
            let effective_status = request.effective_status(now, has_outstanding);
            result.push(RequestSummary {
                request,
                effective_status,
            });
        }

        Ok((result, total))
    }

    /// Active requests past their required date with items still out
    pub async fn list_overdue(&self) -> AppResult<Vec<RequestSummary>> {
        let sql = format!(
            r#"
            SELECT r.* FROM borrowing_requests r
            WHERE r.status = 'active' AND r.required_date < NOW() AND {}
            ORDER BY r.required_date
            "#,
            HAS_OUTSTANDING_SQL
        );
        let requests = sqlx::query_as::<_, BorrowingRequest>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests
            .into_iter()
            .map(|request| RequestSummary {
                effective_status: RequestStatus::Overdue,
                request,
            })
            .collect())
    }

    /// Per-item borrowed/returned balances for a request
    pub async fn outstanding_balances(&self, request_id: i32) -> AppResult<Vec<ItemBalance>> {
        // Ensure the request exists so unknown ids surface as 404, not []
        self.get_by_id(request_id).await?;

        let balances = sqlx::query_as::<_, ItemBalance>(
            r#"
            SELECT bi.id AS borrowing_item_id,
                   bi.item_description,
                   COALESCE(bi.quantity_borrowed, 0) AS quantity_borrowed,
                   COALESCE((
                       SELECT SUM(ri.quantity_returned)::int FROM return_items ri
                       WHERE ri.borrowing_item_id = bi.id), 0) AS quantity_returned
            FROM borrowing_items bi
            WHERE bi.request_id = $1
            ORDER BY bi.id
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(balances)
    }

    /// Full detail projection: header, items, balances, ledger history
    pub async fn get_detail(&self, request_id: i32) -> AppResult<RequestDetail> {
        let request = self.get_by_id(request_id).await?;
        let items = self.get_items(request_id).await?;
        let balances = self.outstanding_balances(request_id).await?;
        let transactions = super::ledger::fetch_transaction_details(&self.pool, request_id).await?;

        let has_outstanding = balances.iter().any(|b| b.outstanding() > 0);
        let effective_status = request.effective_status(Utc::now(), has_outstanding);

        Ok(RequestDetail {
            request,
            effective_status,
            items,
            balances,
            transactions,
        })
    }
}
