//! Return item correction and damage report endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        damage::{DamageReport, FileDamageReport},
        return_item::{ReturnItem, UpdateReturnItem},
    },
};

/// Update a return item
#[utoipa::path(
    put,
    path = "/return-items/{id}",
    tag = "returns",
    params(("id" = i32, Path, description = "Return item ID")),
    request_body = UpdateReturnItem,
    responses(
        (status = 200, description = "Return item updated", body = ReturnItem),
        (status = 404, description = "Return item not found"),
        (status = 409, description = "Locked by a damage report"),
        (status = 422, description = "Update would exceed borrowed quantity")
    )
)]
pub async fn update_return_item(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateReturnItem>,
) -> AppResult<Json<ReturnItem>> {
    let return_item = state.services.lifecycle.update_return_item(id, &payload).await?;
    Ok(Json(return_item))
}

/// Delete a return item
#[utoipa::path(
    delete,
    path = "/return-items/{id}",
    tag = "returns",
    params(("id" = i32, Path, description = "Return item ID")),
    responses(
        (status = 204, description = "Return item deleted"),
        (status = 404, description = "Return item not found"),
        (status = 409, description = "Locked by a damage report")
    )
)]
pub async fn delete_return_item(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.lifecycle.delete_return_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// File a damage report against a return item
#[utoipa::path(
    post,
    path = "/return-items/{id}/damage-report",
    tag = "damage-reports",
    params(("id" = i32, Path, description = "Return item ID")),
    request_body = FileDamageReport,
    responses(
        (status = 201, description = "Damage report filed", body = DamageReport),
        (status = 404, description = "Return item not found"),
        (status = 409, description = "Report already exists"),
        (status = 422, description = "Return item is not damaged or lost")
    )
)]
pub async fn file_damage_report(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<FileDamageReport>,
) -> AppResult<(StatusCode, Json<DamageReport>)> {
    let report = state.services.lifecycle.file_damage_report(id, &payload).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// Get a damage report
#[utoipa::path(
    get,
    path = "/damage-reports/{id}",
    tag = "damage-reports",
    params(("id" = i32, Path, description = "Damage report ID")),
    responses(
        (status = 200, description = "Damage report", body = DamageReport),
        (status = 404, description = "Damage report not found")
    )
)]
pub async fn get_damage_report(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<DamageReport>> {
    let report = state.services.lifecycle.get_damage_report(id).await?;
    Ok(Json(report))
}

/// Damage reports for a request
#[utoipa::path(
    get,
    path = "/requests/{id}/damage-reports",
    tag = "damage-reports",
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Damage reports across the request's returns", body = Vec<DamageReport>),
        (status = 404, description = "Request not found")
    )
)]
pub async fn list_damage_reports(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<DamageReport>>> {
    let reports = state.services.lifecycle.list_damage_reports(id).await?;
    Ok(Json(reports))
}
