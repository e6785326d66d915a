//! Item type (catalog) model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Item type record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ItemType {
    pub id: i32,
    /// Display name, e.g. "Pallet jack"
    pub name: String,
    /// Unit of measure, e.g. "pcs", "box"
    pub unit: Option<String>,
    /// Estimated replacement value per unit
    #[schema(value_type = Option<f64>)]
    pub estimated_value: Option<Decimal>,
}

/// Create item type request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItemType {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 50))]
    pub unit: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub estimated_value: Option<Decimal>,
}

/// Update item type request.
///
/// None leaves a field unchanged; updates cannot clear a field back to NULL.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItemType {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub unit: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub estimated_value: Option<Decimal>,
}

/// Query parameters for listing item types
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ItemTypeQuery {
    /// Case-insensitive name search
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Paginated item type list
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemTypeList {
    pub items: Vec<ItemType>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}
