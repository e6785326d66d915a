//! Borrowing request lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        request::{
            ApproveRequest, BorrowingRequest, ItemBalance, RejectRequest, RequestDetail,
            RequestList, RequestQuery, RequestSummary, SubmitRequest,
        },
        return_item::ReturnItem,
        transaction::{BorrowItems, BorrowingTransaction, ReturnItems, TransactionDetail},
    },
};

/// Response for ledger-writing operations
#[derive(Serialize, ToSchema)]
pub struct TransactionResponse {
    #[serde(flatten)]
    pub transaction: BorrowingTransaction,
    /// Return lines created by this call (empty for borrows)
    pub return_items: Vec<ReturnItem>,
}

/// List borrowing requests
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    params(RequestQuery),
    responses(
        (status = 200, description = "Paginated requests with derived status", body = RequestList),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<RequestList>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
    let (items, total) = state.services.lifecycle.list_requests(&query).await?;

    Ok(Json(RequestList {
        items,
        total,
        page,
        per_page,
    }))
}

/// Submit a new borrowing request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    request_body = SubmitRequest,
    responses(
        (status = 201, description = "Request submitted", body = BorrowingRequest),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Unknown item type reference")
    )
)]
pub async fn submit_request(
    State(state): State<crate::AppState>,
    Json(payload): Json<SubmitRequest>,
) -> AppResult<(StatusCode, Json<BorrowingRequest>)> {
    let request = state.services.lifecycle.submit_request(&payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// List overdue requests
#[utoipa::path(
    get,
    path = "/requests/overdue",
    tag = "requests",
    responses(
        (status = 200, description = "Active requests past due with items out", body = Vec<RequestSummary>)
    )
)]
pub async fn list_overdue_requests(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<RequestSummary>>> {
    let requests = state.services.lifecycle.list_overdue_requests().await?;
    Ok(Json(requests))
}

/// Get request detail
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request with items, balances and ledger", body = RequestDetail),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<RequestDetail>> {
    let detail = state.services.lifecycle.get_request_detail(id).await?;
    Ok(Json(detail))
}

/// Delete a request without ledger history
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request has transactions")
    )
)]
pub async fn delete_request(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.lifecycle.delete_request(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Approve a pending request
#[utoipa::path(
    post,
    path = "/requests/{id}/approve",
    tag = "requests",
    params(("id" = i32, Path, description = "Request ID")),
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Request approved", body = BorrowingRequest),
        (status = 400, description = "Approved quantity exceeds requested"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn approve_request(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ApproveRequest>,
) -> AppResult<Json<BorrowingRequest>> {
    let request = state.services.lifecycle.approve_request(id, &payload).await?;
    Ok(Json(request))
}

/// Reject a pending request
#[utoipa::path(
    post,
    path = "/requests/{id}/reject",
    tag = "requests",
    params(("id" = i32, Path, description = "Request ID")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Request rejected", body = BorrowingRequest),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn reject_request(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<RejectRequest>,
) -> AppResult<Json<BorrowingRequest>> {
    let request = state.services.lifecycle.reject_request(id, &payload).await?;
    Ok(Json(request))
}

/// Borrow approved items
#[utoipa::path(
    post,
    path = "/requests/{id}/borrow",
    tag = "ledger",
    params(("id" = i32, Path, description = "Request ID")),
    request_body = BorrowItems,
    responses(
        (status = 201, description = "Borrow recorded, request active", body = TransactionResponse),
        (status = 404, description = "Request or item not found"),
        (status = 409, description = "Request is not approved"),
        (status = 422, description = "Quantity exceeds approved amount")
    )
)]
pub async fn borrow_items(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<BorrowItems>,
) -> AppResult<(StatusCode, Json<TransactionResponse>)> {
    let transaction = state.services.lifecycle.borrow_items(id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse {
            transaction,
            return_items: Vec::new(),
        }),
    ))
}

/// Return items (full or partial)
#[utoipa::path(
    post,
    path = "/requests/{id}/return",
    tag = "ledger",
    params(("id" = i32, Path, description = "Request ID")),
    request_body = ReturnItems,
    responses(
        (status = 201, description = "Return recorded", body = TransactionResponse),
        (status = 404, description = "Request or item not found"),
        (status = 409, description = "Request is not active"),
        (status = 422, description = "Return exceeds borrowed quantity")
    )
)]
pub async fn return_items(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ReturnItems>,
) -> AppResult<(StatusCode, Json<TransactionResponse>)> {
    let (transaction, return_items) =
        state.services.lifecycle.return_items(id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse {
            transaction,
            return_items,
        }),
    ))
}

/// Close a fully returned request
#[utoipa::path(
    post,
    path = "/requests/{id}/close",
    tag = "requests",
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request closed", body = BorrowingRequest),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not active"),
        (status = 422, description = "Outstanding balance remains")
    )
)]
pub async fn close_request(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowingRequest>> {
    let request = state.services.lifecycle.close_request(id).await?;
    Ok(Json(request))
}

/// Outstanding balances per line item
#[utoipa::path(
    get,
    path = "/requests/{id}/outstanding",
    tag = "ledger",
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Per-item borrowed/returned balances", body = Vec<ItemBalance>),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_outstanding(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<ItemBalance>>> {
    let balances = state.services.lifecycle.get_outstanding_balances(id).await?;
    Ok(Json(balances))
}

/// Ledger history for a request
#[utoipa::path(
    get,
    path = "/requests/{id}/transactions",
    tag = "ledger",
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Transactions with return lines", body = Vec<TransactionDetail>),
        (status = 404, description = "Request not found")
    )
)]
pub async fn list_transactions(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<TransactionDetail>>> {
    let transactions = state.services.lifecycle.list_transactions(id).await?;
    Ok(Json(transactions))
}
