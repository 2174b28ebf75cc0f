//! Catalog read endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::catalog::{Item, ItemDetails, PartAvailability},
};

/// List all items
#[utoipa::path(
    get,
    path = "/items",
    tag = "catalog",
    responses(
        (status = 200, description = "All catalog items", body = Vec<Item>)
    )
)]
pub async fn list_items(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Item>>> {
    let items = state.services.catalog.list_items().await?;
    Ok(Json(items))
}

/// Get an item with its parts and computed availability
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item details", body = ItemDetails),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ItemDetails>> {
    let item = state.services.catalog.get_item(id).await?;
    Ok(Json(item))
}

/// Get a part with computed availability
#[utoipa::path(
    get,
    path = "/parts/{id}",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Part ID")
    ),
    responses(
        (status = 200, description = "Part details", body = PartAvailability),
        (status = 404, description = "Part not found")
    )
)]
pub async fn get_part(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<PartAvailability>> {
    let part = state.services.catalog.get_part(id).await?;
    Ok(Json(part))
}
