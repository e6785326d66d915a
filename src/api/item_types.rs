//! Item type catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::item_type::{CreateItemType, ItemType, ItemTypeList, ItemTypeQuery, UpdateItemType},
};

/// List item types
#[utoipa::path(
    get,
    path = "/item-types",
    tag = "item-types",
    params(ItemTypeQuery),
    responses(
        (status = 200, description = "Paginated item types", body = ItemTypeList)
    )
)]
pub async fn list_item_types(
    State(state): State<crate::AppState>,
    Query(query): Query<ItemTypeQuery>,
) -> AppResult<Json<ItemTypeList>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
    let (items, total) = state.services.catalog.list(&query).await?;

    Ok(Json(ItemTypeList {
        items,
        total,
        page,
        per_page,
    }))
}

/// Get an item type
#[utoipa::path(
    get,
    path = "/item-types/{id}",
    tag = "item-types",
    params(("id" = i32, Path, description = "Item type ID")),
    responses(
        (status = 200, description = "Item type", body = ItemType),
        (status = 404, description = "Item type not found")
    )
)]
pub async fn get_item_type(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ItemType>> {
    let item_type = state.services.catalog.get(id).await?;
    Ok(Json(item_type))
}

/// Create an item type
#[utoipa::path(
    post,
    path = "/item-types",
    tag = "item-types",
    request_body = CreateItemType,
    responses(
        (status = 201, description = "Item type created", body = ItemType),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_item_type(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateItemType>,
) -> AppResult<(StatusCode, Json<ItemType>)> {
    let item_type = state.services.catalog.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(item_type)))
}

/// Update an item type
#[utoipa::path(
    put,
    path = "/item-types/{id}",
    tag = "item-types",
    params(("id" = i32, Path, description = "Item type ID")),
    request_body = UpdateItemType,
    responses(
        (status = 200, description = "Item type updated", body = ItemType),
        (status = 404, description = "Item type not found")
    )
)]
pub async fn update_item_type(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateItemType>,
) -> AppResult<Json<ItemType>> {
    let item_type = state.services.catalog.update(id, &payload).await?;
    Ok(Json(item_type))
}

/// Delete an item type
#[utoipa::path(
    delete,
    path = "/item-types/{id}",
    tag = "item-types",
    params(("id" = i32, Path, description = "Item type ID")),
    responses(
        (status = 204, description = "Item type deleted"),
        (status = 404, description = "Item type not found"),
        (status = 409, description = "Item type still referenced by borrowing items")
    )
)]
pub async fn delete_item_type(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
