//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, item_types, requests, returns};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Depot API",
        version = "1.0.0",
        description = "Warehouse Borrowing Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Item types
        item_types::list_item_types,
        item_types::get_item_type,
        item_types::create_item_type,
        item_types::update_item_type,
        item_types::delete_item_type,
        // Requests
        requests::list_requests,
        requests::submit_request,
        requests::list_overdue_requests,
        requests::get_request,
        requests::delete_request,
        requests::approve_request,
        requests::reject_request,
        requests::close_request,
        // Ledger
        requests::borrow_items,
        requests::return_items,
        requests::get_outstanding,
        requests::list_transactions,
        // Returns & damage reports
        returns::update_return_item,
        returns::delete_return_item,
        returns::file_damage_report,
        returns::get_damage_report,
        returns::list_damage_reports,
    ),
    components(
        schemas(
            // Enums
            crate::models::enums::RequestStatus,
            crate::models::enums::TransactionType,
            crate::models::enums::ConditionStatus,
            // Item types
            crate::models::item_type::ItemType,
            crate::models::item_type::CreateItemType,
            crate::models::item_type::UpdateItemType,
            crate::models::item_type::ItemTypeList,
            // Requests
            crate::models::request::BorrowingRequest,
            crate::models::request::BorrowingItem,
            crate::models::request::ItemBalance,
            crate::models::request::RequestItemInput,
            crate::models::request::SubmitRequest,
            crate::models::request::ItemApproval,
            crate::models::request::ApproveRequest,
            crate::models::request::RejectRequest,
            crate::models::request::RequestSummary,
            crate::models::request::RequestList,
            crate::models::request::RequestDetail,
            // Ledger
            crate::models::transaction::BorrowingTransaction,
            crate::models::transaction::TransactionDetail,
            crate::models::transaction::BorrowLine,
            crate::models::transaction::BorrowItems,
            crate::models::transaction::ReturnLine,
            crate::models::transaction::ReturnItems,
            requests::TransactionResponse,
            // Returns
            crate::models::return_item::ReturnItem,
            crate::models::return_item::UpdateReturnItem,
            // Damage reports
            crate::models::damage::DamageReport,
            crate::models::damage::FileDamageReport,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "item-types", description = "Item type catalog management"),
        (name = "requests", description = "Borrowing request lifecycle"),
        (name = "ledger", description = "Borrow/return transaction ledger"),
        (name = "returns", description = "Return item condition tracking"),
        (name = "damage-reports", description = "Damage and loss reporting")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
