//! Borrowing request aggregate: request header and line items

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::RequestStatus;
use super::transaction::TransactionDetail;

/// Borrowing request header from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowingRequest {
    pub id: i32,
    pub customer_id: i32,
    /// Employee who submitted the request
    pub employee_id: i32,
    pub location_id: i32,
    pub purpose: String,
    pub notes: Option<String>,
    pub request_date: DateTime<Utc>,
    /// Advisory date items should be back; drives overdue derivation
    pub required_date: DateTime<Utc>,
    pub status: RequestStatus,
    pub approved_by: Option<i32>,
    pub approved_date: Option<DateTime<Utc>>,
}

impl BorrowingRequest {
    /// Status as reported to callers.
    ///
    /// Overdue is never stored: an active request past its required date with
    /// items still out is reported overdue at read time.
    pub fn effective_status(&self, now: DateTime<Utc>, has_outstanding: bool) -> RequestStatus {
        if self.status == RequestStatus::Active && self.required_date < now && has_outstanding {
            RequestStatus::Overdue
        } else {
            self.status
        }
    }
}

/// Request line item from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowingItem {
    pub id: i32,
    pub request_id: i32,
    /// Catalog reference; None for free-text items
    pub item_type_id: Option<i32>,
    pub item_description: String,
    pub quantity_requested: i32,
    pub quantity_approved: Option<i32>,
    pub quantity_borrowed: Option<i32>,
    #[schema(value_type = Option<f64>)]
    pub estimated_value: Option<Decimal>,
}

/// Per-item borrowed/returned bookkeeping for a request
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ItemBalance {
    pub borrowing_item_id: i32,
    pub item_description: String,
    pub quantity_borrowed: i32,
    pub quantity_returned: i32,
}

impl ItemBalance {
    /// Quantity still out: borrowed minus everything returned so far.
    pub fn outstanding(&self) -> i32 {
        self.quantity_borrowed - self.quantity_returned
    }
}

/// Line item in a submit payload
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RequestItemInput {
    pub item_type_id: Option<i32>,
    #[validate(length(min = 1, max = 500))]
    pub item_description: String,
    #[validate(range(min = 1))]
    pub quantity_requested: i32,
    #[schema(value_type = Option<f64>)]
    pub estimated_value: Option<Decimal>,
}

/// Submit borrowing request payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitRequest {
    pub customer_id: i32,
    pub employee_id: i32,
    pub location_id: i32,
    #[validate(length(min = 1, max = 1000))]
    pub purpose: String,
    pub notes: Option<String>,
    pub required_date: DateTime<Utc>,
    #[validate(length(min = 1), nested)]
    pub items: Vec<RequestItemInput>,
}

/// Per-item approved quantity override
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ItemApproval {
    pub borrowing_item_id: i32,
    #[validate(range(min = 0))]
    pub quantity_approved: i32,
}

/// Approve request payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ApproveRequest {
    pub admin_id: i32,
    /// Per-item quantities; unlisted items default to the requested quantity
    #[validate(nested)]
    pub approvals: Option<Vec<ItemApproval>>,
}

/// Reject request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    pub admin_id: i32,
    pub reason: Option<String>,
}

/// Query parameters for listing requests
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RequestQuery {
    /// Filter on status; `overdue` selects active requests past due with
    /// outstanding items
    pub status: Option<String>,
    pub customer_id: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Request list entry with its derived status
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestSummary {
    #[serde(flatten)]
    pub request: BorrowingRequest,
    /// Status with overdue derivation applied
    pub effective_status: RequestStatus,
}

/// Paginated request list
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestList {
    pub items: Vec<RequestSummary>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Full detail projection of a request
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: BorrowingRequest,
    pub effective_status: RequestStatus,
    pub items: Vec<BorrowingItem>,
    pub balances: Vec<ItemBalance>,
    pub transactions: Vec<TransactionDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(status: RequestStatus, required_in_days: i64) -> BorrowingRequest {
        let now = Utc::now();
        BorrowingRequest {
            id: 1,
            customer_id: 1,
            employee_id: 1,
            location_id: 1,
            purpose: "inventory count".to_string(),
            notes: None,
            request_date: now,
            required_date: now + Duration::days(required_in_days),
            status,
            approved_by: None,
            approved_date: None,
        }
    }

    #[test]
    fn active_past_due_with_outstanding_is_overdue() {
        let r = request(RequestStatus::Active, -3);
        assert_eq!(r.effective_status(Utc::now(), true), RequestStatus::Overdue);
    }

    #[test]
    fn active_past_due_fully_returned_is_not_overdue() {
        let r = request(RequestStatus::Active, -3);
        assert_eq!(r.effective_status(Utc::now(), false), RequestStatus::Active);
    }

    #[test]
    fn active_before_due_date_is_not_overdue() {
        let r = request(RequestStatus::Active, 3);
        assert_eq!(r.effective_status(Utc::now(), true), RequestStatus::Active);
    }

    #[test]
    fn non_active_statuses_never_derive_overdue() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Returned,
        ] {
            let r = request(status, -10);
            assert_eq!(r.effective_status(Utc::now(), true), status);
        }
    }

    #[test]
    fn outstanding_is_borrowed_minus_returned() {
        let balance = ItemBalance {
            borrowing_item_id: 1,
            item_description: "hand truck".to_string(),
            quantity_borrowed: 8,
            quantity_returned: 5,
        };
        assert_eq!(balance.outstanding(), 3);
    }
}
