//! Return item repository: condition tracking updates and deletes
//!
//! Return items are created only by the ledger's record_return; this module
//! covers the corrections the UI exposes, with the damage-report lock
//! enforced server-side.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::return_item::{ReturnItem, UpdateReturnItem},
};

#[derive(Clone)]
pub struct ReturnItemsRepository {
    pool: Pool<Postgres>,
}

impl ReturnItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get return item by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<ReturnItem> {
        sqlx::query_as::<_, ReturnItem>("SELECT * FROM return_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Return item {} not found", id)))
    }

    /// Update a return item.
    ///
    /// Rejected once a damage report references the row. A quantity change
    /// re-validates conservation under the owning request's row lock.
    pub async fn update(&self, id: i32, data: &UpdateReturnItem) -> AppResult<ReturnItem> {
        let mut tx = self.pool.begin().await?;

        // Serialize with ledger operations on the same request
        let request_id: i32 = sqlx::query_scalar(
            r#"
            SELECT t.request_id FROM return_items ri
            JOIN borrowing_transactions t ON ri.transaction_id = t.id
            WHERE ri.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Return item {} not found", id)))?;

        sqlx::query("SELECT id FROM borrowing_requests WHERE id = $1 FOR UPDATE")
            .bind(request_id)
            .execute(&mut *tx)
            .await?;

        let current = sqlx::query_as::<_, ReturnItem>("SELECT * FROM return_items WHERE id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        self.check_not_locked(&mut tx, id).await?;

        if let Some(new_quantity) = data.quantity_returned {
            let borrowed: i32 = sqlx::query_scalar(
                "SELECT COALESCE(quantity_borrowed, 0) FROM borrowing_items WHERE id = $1",
            )
            .bind(current.borrowing_item_id)
            .fetch_one(&mut *tx)
            .await?;
            let other_returns: i64 = sqlx::query_scalar(
                "SELECT COALESCE(SUM(quantity_returned), 0) FROM return_items WHERE borrowing_item_id = $1 AND id != $2",
            )
            .bind(current.borrowing_item_id)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            if other_returns as i32 + new_quantity > borrowed {
                return Err(AppError::OverReturn(format!(
                    "Updating return item {} to {} exceeds borrowed quantity {}",
                    id, new_quantity, borrowed
                )));
            }
        }

        let updated = sqlx::query_as::<_, ReturnItem>(
            r#"
            UPDATE return_items
            SET quantity_returned = $1, condition_status = $2, damage_notes = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(data.quantity_returned.unwrap_or(current.quantity_returned))
        .bind(data.condition_status.unwrap_or(current.condition_status))
        .bind(data.damage_notes.as_ref().or(current.damage_notes.as_ref()))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a return item; blocked while a damage report references it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM return_items WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Return item {} not found", id)));
        }

        self.check_not_locked(&mut tx, id).await?;

        sqlx::query("DELETE FROM return_items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn check_not_locked(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        return_item_id: i32,
    ) -> AppResult<()> {
        let locked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM damage_reports WHERE return_item_id = $1)",
        )
        .bind(return_item_id)
        .fetch_one(&mut **tx)
        .await?;

        if locked {
            return Err(AppError::LockedByDamageReport(format!(
                "Return item {} has a damage report and cannot be modified",
                return_item_id
            )));
        }
        Ok(())
    }
}
