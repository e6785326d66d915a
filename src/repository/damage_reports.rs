//! Damage/loss report repository

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        damage::{DamageReport, FileDamageReport},
        return_item::ReturnItem,
    },
};

#[derive(Clone)]
pub struct DamageReportsRepository {
    pool: Pool<Postgres>,
}

impl DamageReportsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get damage report by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<DamageReport> {
        sqlx::query_as::<_, DamageReport>("SELECT * FROM damage_reports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Damage report {} not found", id)))
    }

    /// File a damage report for a damaged or lost return item.
    ///
    /// At most one report per return item; the unique constraint backs the
    /// check against concurrent filings.
    pub async fn file(
        &self,
        return_item_id: i32,
        data: &FileDamageReport,
    ) -> AppResult<DamageReport> {
        let mut tx = self.pool.begin().await?;

        // Serialize with ledger and return-item operations on the same
        // request; the condition check below must see committed state
        let request_id: i32 = sqlx::query_scalar(
            r#"
            SELECT t.request_id FROM return_items ri
            JOIN borrowing_transactions t ON ri.transaction_id = t.id
            WHERE ri.id = $1
            "#,
        )
        .bind(return_item_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Return item {} not found", return_item_id)))?;

        sqlx::query("SELECT id FROM borrowing_requests WHERE id = $1 FOR UPDATE")
            .bind(request_id)
            .execute(&mut *tx)
            .await?;

        let return_item =
            sqlx::query_as::<_, ReturnItem>("SELECT * FROM return_items WHERE id = $1")
                .bind(return_item_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Return item {} not found", return_item_id))
                })?;

        if !return_item.condition_status.is_reportable() {
            return Err(AppError::InvalidCondition(format!(
                "Return item {} is {}, only damaged or lost items take damage reports",
                return_item_id, return_item.condition_status
            )));
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM damage_reports WHERE return_item_id = $1)",
        )
        .bind(return_item_id)
        .fetch_one(&mut *tx)
        .await?;
        if exists {
            return Err(AppError::DuplicateReport(format!(
                "Return item {} already has a damage report",
                return_item_id
            )));
        }

        let report = sqlx::query_as::<_, DamageReport>(
            r#"
            INSERT INTO damage_reports
                (return_item_id, damage_type, damage_description,
                 repair_cost, replacement_cost, reported_by, report_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(return_item_id)
        .bind(&data.damage_type)
        .bind(&data.damage_description)
        .bind(data.repair_cost)
        .bind(data.replacement_cost)
        .bind(data.employee_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateReport(
                format!("Return item {} already has a damage report", return_item_id),
            ),
            _ => AppError::Database(e),
        })?;

        tx.commit().await?;
        Ok(report)
    }

    /// Damage reports filed against a request's return items
    pub async fn list_for_request(&self, request_id: i32) -> AppResult<Vec<DamageReport>> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM borrowing_requests WHERE id = $1)")
                .bind(request_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Request {} not found", request_id)));
        }

        let reports = sqlx::query_as::<_, DamageReport>(
            r#"
            SELECT dr.* FROM damage_reports dr
            JOIN return_items ri ON dr.return_item_id = ri.id
            JOIN borrowing_transactions t ON ri.transaction_id = t.id
            WHERE t.request_id = $1
            ORDER BY dr.report_date DESC
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }
}
