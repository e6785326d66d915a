//! Return item model and condition tracking payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::ConditionStatus;

/// Returned quantity and condition for one line item, one transaction
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReturnItem {
    pub id: i32,
    pub transaction_id: i32,
    pub borrowing_item_id: i32,
    pub quantity_returned: i32,
    pub condition_status: ConditionStatus,
    pub damage_notes: Option<String>,
    pub return_date: DateTime<Utc>,
}

/// Update return item payload. Rejected outright once a damage report
/// references the row.
///
/// None leaves a field unchanged; updates cannot clear a field back to NULL.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReturnItem {
    #[validate(range(min = 1))]
    pub quantity_returned: Option<i32>,
    pub condition_status: Option<ConditionStatus>,
    pub damage_notes: Option<String>,
}
