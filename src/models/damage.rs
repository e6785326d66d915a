//! Damage/loss report model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Damage report record; at most one per return item
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DamageReport {
    pub id: i32,
    pub return_item_id: i32,
    pub damage_type: String,
    pub damage_description: String,
    /// Estimated repair cost; independent of replacement_cost, both may be
    /// recorded while the repair/replace decision is open
    #[schema(value_type = Option<f64>)]
    pub repair_cost: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub replacement_cost: Option<Decimal>,
    pub reported_by: i32,
    pub report_date: DateTime<Utc>,
}

/// File damage report payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FileDamageReport {
    pub employee_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub damage_type: String,
    #[validate(length(min = 1, max = 2000))]
    pub damage_description: String,
    #[schema(value_type = Option<f64>)]
    pub repair_cost: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub replacement_cost: Option<Decimal>,
}
