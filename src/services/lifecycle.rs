//! Borrowing lifecycle orchestrator
//!
//! Single façade over the request aggregate, the transaction ledger, the
//! return tracker and damage reporting. The web layer never touches ledger
//! or return state directly, so every multi-step operation goes through the
//! invariant checks in the repositories.

use crate::{
    error::{AppError, AppResult},
    models::{
        damage::{DamageReport, FileDamageReport},
        enums::RequestStatus,
        request::{
            ApproveRequest, BorrowingRequest, ItemBalance, RejectRequest, RequestDetail,
            RequestQuery, RequestSummary, SubmitRequest,
        },
        return_item::{ReturnItem, UpdateReturnItem},
        transaction::{BorrowItems, BorrowingTransaction, ReturnItems, TransactionDetail},
    },
    repository::Repository,
};

use super::catalog::check_non_negative;

#[derive(Clone)]
pub struct LifecycleService {
    repository: Repository,
}

impl LifecycleService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Submit a new borrowing request (status pending)
    pub async fn submit_request(&self, data: &SubmitRequest) -> AppResult<BorrowingRequest> {
        super::validate(data)?;
        for item in &data.items {
            check_non_negative("estimated_value", item.estimated_value)?;
            // Catalog references must resolve; free-text lines carry None
            if let Some(item_type_id) = item.item_type_id {
                self.repository.item_types.get_by_id(item_type_id).await?;
            }
        }
        self.repository.requests.create(data).await
    }

    /// Approve a pending request with optional per-item quantities
    pub async fn approve_request(
        &self,
        request_id: i32,
        data: &ApproveRequest,
    ) -> AppResult<BorrowingRequest> {
        super::validate(data)?;
        let approvals = data.approvals.as_deref().unwrap_or(&[]);
        self.repository
            .requests
            .approve(request_id, data.admin_id, approvals)
            .await
    }

    /// Reject a pending request
    pub async fn reject_request(
        &self,
        request_id: i32,
        data: &RejectRequest,
    ) -> AppResult<BorrowingRequest> {
        self.repository
            .requests
            .reject(request_id, data.admin_id, data.reason.as_deref())
            .await
    }

    /// Record the borrow transaction; activates the request
    pub async fn borrow_items(
        &self,
        request_id: i32,
        data: &BorrowItems,
    ) -> AppResult<BorrowingTransaction> {
        super::validate(data)?;
        self.repository.ledger.record_borrow(request_id, data).await
    }

    /// Record a full or partial return
    pub async fn return_items(
        &self,
        request_id: i32,
        data: &ReturnItems,
    ) -> AppResult<(BorrowingTransaction, Vec<ReturnItem>)> {
        super::validate(data)?;
        self.repository.ledger.record_return(request_id, data).await
    }

    /// Close a fully returned request
    pub async fn close_request(&self, request_id: i32) -> AppResult<BorrowingRequest> {
        self.repository.requests.close(request_id).await
    }

    /// Delete a request without ledger history
    pub async fn delete_request(&self, request_id: i32) -> AppResult<()> {
        self.repository.requests.delete(request_id).await
    }

    /// List requests; the status filter accepts the derived `overdue` value
    pub async fn list_requests(
        &self,
        query: &RequestQuery,
    ) -> AppResult<(Vec<RequestSummary>, i64)> {
        if let Some(status) = query.status.as_deref() {
            status
                .parse::<RequestStatus>()
                .map_err(AppError::Validation)?;
        }
        self.repository.requests.list(query).await
    }

    /// Active requests past due with items still out
    pub async fn list_overdue_requests(&self) -> AppResult<Vec<RequestSummary>> {
        self.repository.requests.list_overdue().await
    }

    /// Full request projection: items, balances, ledger history
    pub async fn get_request_detail(&self, request_id: i32) -> AppResult<RequestDetail> {
        self.repository.requests.get_detail(request_id).await
    }

    /// Per-item borrowed/returned balances
    pub async fn get_outstanding_balances(&self, request_id: i32) -> AppResult<Vec<ItemBalance>> {
        self.repository.requests.outstanding_balances(request_id).await
    }

    /// Ledger history for a request
    pub async fn list_transactions(&self, request_id: i32) -> AppResult<Vec<TransactionDetail>> {
        self.repository.ledger.list_for_request(request_id).await
    }

    /// Correct a return item (blocked once a damage report exists)
    pub async fn update_return_item(
        &self,
        return_item_id: i32,
        data: &UpdateReturnItem,
    ) -> AppResult<ReturnItem> {
        super::validate(data)?;
        self.repository.return_items.update(return_item_id, data).await
    }

    /// Remove a return item (blocked once a damage report exists)
    pub async fn delete_return_item(&self, return_item_id: i32) -> AppResult<()> {
        self.repository.return_items.delete(return_item_id).await
    }

    /// File a damage report against a damaged or lost return item
    pub async fn file_damage_report(
        &self,
        return_item_id: i32,
        data: &FileDamageReport,
    ) -> AppResult<DamageReport> {
        super::validate(data)?;
        check_non_negative("repair_cost", data.repair_cost)?;
        check_non_negative("replacement_cost", data.replacement_cost)?;
        self.repository.damage_reports.file(return_item_id, data).await
    }

    /// Get a damage report
    pub async fn get_damage_report(&self, report_id: i32) -> AppResult<DamageReport> {
        self.repository.damage_reports.get_by_id(report_id).await
    }

    /// Damage reports across a request's return items
    pub async fn list_damage_reports(&self, request_id: i32) -> AppResult<Vec<DamageReport>> {
        self.repository.damage_reports.list_for_request(request_id).await
    }
}
