use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use sqlx::types::Uuid;
use tabletop_runtime::wire::{
    DeleteResponse, ItemTemplateCreate, ItemTemplateQuery, ItemTemplateResponse, ItemTemplateUpdate,
};

use crate::response::AppError;
use crate::GlobalState;

pub fn item_template_routes() -> Router<GlobalState> {
    Router::new()
        .route("/item-template/add-item-template", post(add_item_template))
        .route("/item-template", get(list_item_templates))
        .route("/item-template/{id}",
            get(get_item_template)
            .put(update_item_template)
            .delete(delete_item_template)
        )
}

async fn add_item_template(
    State(state): State<GlobalState>,
    Json(payload): Json<ItemTemplateCreate>,
) -> Result<(StatusCode, Json<ItemTemplateResponse>), AppError> {
    let template = state.item_templates.add_item_template(payload).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

async fn list_item_templates(
    State(state): State<GlobalState>,
    Query(query): Query<ItemTemplateQuery>,
) -> Result<Json<Vec<ItemTemplateResponse>>, AppError> {
    Ok(Json(state.item_templates.list_item_templates(query).await?))
}

async fn get_item_template(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemTemplateResponse>, AppError> {
    Ok(Json(state.item_templates.get_item_template(id).await?))
}

async fn update_item_template(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ItemTemplateUpdate>,
) -> Result<Json<ItemTemplateResponse>, AppError> {
    Ok(Json(state.item_templates.update_item_template(id, payload).await?))
}

async fn delete_item_template(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    let outcome = state.item_templates.delete_item_template(id).await?;
    Ok(Json(DeleteResponse { deleted: outcome.was_deleted() }))
}
