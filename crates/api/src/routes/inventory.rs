use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{middleware, Extension, Json, Router};
use sqlx::types::Uuid;
use tabletop_runtime::wire::{AddItemRequest, InventoryItemChange, InventoryResponse, QuantityChange};

use crate::middleware::{authenticate, UserId};
use crate::response::AppError;
use crate::GlobalState;

pub fn inventory_routes() -> Router<GlobalState> {
    Router::new()
        .route("/inventory/{id}", get(get_inventory))
        .route("/inventory/{id}/add-item",
            post(add_item)
            .route_layer(middleware::from_fn(authenticate))
        )
        .route("/inventory/item/{item_id}",
            patch(change_item_quantity)
            .delete(remove_item)
            .route_layer(middleware::from_fn(authenticate))
        )
}

async fn get_inventory(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryResponse>, AppError> {
    Ok(Json(state.inventories.get_inventory(id).await?))
}

async fn add_item(
    State(state): State<GlobalState>,
    Extension(user): Extension<UserId>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<InventoryItemChange>), AppError> {
    let change = state.inventories.add_item(user.as_str(), id, payload).await?;
    Ok((StatusCode::CREATED, Json(change)))
}

/// Body is `{"delta": n}` or `{"quantity": n}`. A decrement past zero leaves the item at zero.
async fn change_item_quantity(
    State(state): State<GlobalState>,
    Extension(user): Extension<UserId>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<QuantityChange>,
) -> Result<Json<InventoryItemChange>, AppError> {
    let change = state
        .inventories
        .change_quantity(user.as_str(), item_id, payload)
        .await?;
    Ok(Json(change))
}

async fn remove_item(
    State(state): State<GlobalState>,
    Extension(user): Extension<UserId>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<InventoryItemChange>, AppError> {
    Ok(Json(state.inventories.remove_item(user.as_str(), item_id).await?))
}
