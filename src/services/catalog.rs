//! Item type catalog service

use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::item_type::{CreateItemType, ItemType, ItemTypeQuery, UpdateItemType},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List item types
    pub async fn list(&self, query: &ItemTypeQuery) -> AppResult<(Vec<ItemType>, i64)> {
        self.repository.item_types.list(query).await
    }

    /// Get a single item type
    pub async fn get(&self, id: i32) -> AppResult<ItemType> {
        self.repository.item_types.get_by_id(id).await
    }

    /// Create an item type
    pub async fn create(&self, data: &CreateItemType) -> AppResult<ItemType> {
        super::validate(data)?;
        check_non_negative("estimated_value", data.estimated_value)?;
        self.repository.item_types.create(data).await
    }

    /// Update an item type
    pub async fn update(&self, id: i32, data: &UpdateItemType) -> AppResult<ItemType> {
        super::validate(data)?;
        check_non_negative("estimated_value", data.estimated_value)?;
        self.repository.item_types.update(id, data).await
    }

    /// Delete an unreferenced item type
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.item_types.delete(id).await
    }
}

pub(crate) fn check_non_negative(field: &str, value: Option<Decimal>) -> AppResult<()> {
    if let Some(v) = value {
        if v < Decimal::ZERO {
            return Err(AppError::Validation(format!("{} must not be negative", field)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn negative_money_is_rejected() {
        assert!(check_non_negative("estimated_value", Some(dec!(-0.01))).is_err());
        assert!(check_non_negative("estimated_value", Some(dec!(0))).is_ok());
        assert!(check_non_negative("estimated_value", Some(dec!(149.90))).is_ok());
        assert!(check_non_negative("estimated_value", None).is_ok());
    }
}
