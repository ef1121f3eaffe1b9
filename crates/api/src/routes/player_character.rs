use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Extension, Json, Router};
use sqlx::types::Uuid;
use tabletop_runtime::wire::{
    CreatedPlayerCharacter, DeleteResponse, InventoryResponse, PlayerCharacterCreate,
    PlayerCharacterQuery, PlayerCharacterResponse, PlayerCharacterUpdate,
};

use crate::middleware::{authenticate, UserId};
use crate::response::AppError;
use crate::GlobalState;

pub fn player_character_routes() -> Router<GlobalState> {
    Router::new()
        .route("/player-character/add-player-character", post(add_player_character))
        .route("/player-character", get(list_my_player_characters))
        .route("/player-character/{id}",
            get(get_player_character)
            .put(update_player_character)
            .delete(delete_player_character)
        )
        .route("/player-character/{id}/inventory", get(get_player_character_inventory))
        .route_layer(middleware::from_fn(authenticate))
}

/// The new character is owned by the caller and starts with an empty inventory.
async fn add_player_character(
    State(state): State<GlobalState>,
    Extension(user): Extension<UserId>,
    Json(payload): Json<PlayerCharacterCreate>,
) -> Result<(StatusCode, Json<CreatedPlayerCharacter>), AppError> {
    let created = state
        .player_characters
        .create_player_character(user.as_str(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_my_player_characters(
    State(state): State<GlobalState>,
    Extension(user): Extension<UserId>,
    Query(mut query): Query<PlayerCharacterQuery>,
) -> Result<Json<Vec<PlayerCharacterResponse>>, AppError> {
    query.user_id = Some(user.0);
    Ok(Json(state.player_characters.list_player_characters(query).await?))
}

async fn get_player_character(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayerCharacterResponse>, AppError> {
    Ok(Json(state.player_characters.get_player_character(id).await?))
}

async fn update_player_character(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlayerCharacterUpdate>,
) -> Result<Json<PlayerCharacterResponse>, AppError> {
    Ok(Json(state.player_characters.update_player_character(id, payload).await?))
}

async fn delete_player_character(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    let outcome = state.player_characters.delete_player_character(id).await?;
    Ok(Json(DeleteResponse { deleted: outcome.was_deleted() }))
}

async fn get_player_character_inventory(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryResponse>, AppError> {
    Ok(Json(state.player_characters.get_inventory_for(id).await?))
}
