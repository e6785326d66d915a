//! Item type catalog repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::item_type::{CreateItemType, ItemType, ItemTypeQuery, UpdateItemType},
};

#[derive(Clone)]
pub struct ItemTypesRepository {
    pool: Pool<Postgres>,
}

impl ItemTypesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get item type by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<ItemType> {
        sqlx::query_as::<_, ItemType>("SELECT * FROM item_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item type {} not found", id)))
    }

    /// List item types with optional name search and pagination
    pub async fn list(&self, query: &ItemTypeQuery) -> AppResult<(Vec<ItemType>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
        let pattern = query
            .search
            .as_ref()
            .map(|s| format!("%{}%", s));

        let (rows, total) = match &pattern {
            Some(p) => {
                let rows = sqlx::query_as::<_, ItemType>(
                    "SELECT * FROM item_types WHERE name ILIKE $1 ORDER BY name LIMIT $2 OFFSET $3",
                )
                .bind(p)
                .bind(per_page)
                .bind((page - 1) * per_page)
                .fetch_all(&self.pool)
                .await?;
                let total: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM item_types WHERE name ILIKE $1")
                        .bind(p)
                        .fetch_one(&self.pool)
                        .await?;
                (rows, total)
            }
            None => {
                let rows = sqlx::query_as::<_, ItemType>(
                    "SELECT * FROM item_types ORDER BY name LIMIT $1 OFFSET $2",
                )
                .bind(per_page)
                .bind((page - 1) * per_page)
                .fetch_all(&self.pool)
                .await?;
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM item_types")
                    .fetch_one(&self.pool)
                    .await?;
                (rows, total)
            }
        };

        Ok((rows, total))
    }

    /// Create item type
    pub async fn create(&self, data: &CreateItemType) -> AppResult<ItemType> {
        let row = sqlx::query_as::<_, ItemType>(
            r#"
            INSERT INTO item_types (name, unit, estimated_value)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.unit)
        .bind(data.estimated_value)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update item type
    pub async fn update(&self, id: i32, data: &UpdateItemType) -> AppResult<ItemType> {
        let current = self.get_by_id(id).await?;

        let row = sqlx::query_as::<_, ItemType>(
            r#"
            UPDATE item_types
            SET name = $1, unit = $2, estimated_value = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(data.name.as_ref().unwrap_or(&current.name))
        .bind(data.unit.as_ref().or(current.unit.as_ref()))
        .bind(data.estimated_value.or(current.estimated_value))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Delete item type; rejected while any borrowing item references it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrowing_items WHERE item_type_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if referenced {
            return Err(AppError::Conflict(format!(
                "Item type {} is referenced by borrowing items",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM item_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item type {} not found", id)));
        }
        Ok(())
    }
}
