use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use sqlx::types::Uuid;
use tabletop_runtime::wire::{DeleteResponse, PartyCreate, PartyQuery, PartyResponse, PartyUpdate};

use crate::response::AppError;
use crate::GlobalState;

pub fn party_routes() -> Router<GlobalState> {
    Router::new()
        .route("/party/add-party", post(add_party))
        .route("/party", get(list_parties))
        .route("/party/{id}",
            get(get_party)
            .put(update_party)
            .delete(delete_party)
        )
}

async fn add_party(
    State(state): State<GlobalState>,
    Json(payload): Json<PartyCreate>,
) -> Result<(StatusCode, Json<PartyResponse>), AppError> {
    let party = state.parties.add_party(payload).await?;
    Ok((StatusCode::CREATED, Json(party)))
}

async fn list_parties(
    State(state): State<GlobalState>,
    Query(query): Query<PartyQuery>,
) -> Result<Json<Vec<PartyResponse>>, AppError> {
    Ok(Json(state.parties.list_parties(query.system_id).await?))
}

async fn get_party(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PartyResponse>, AppError> {
    Ok(Json(state.parties.get_party(id).await?))
}

async fn update_party(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PartyUpdate>,
) -> Result<Json<PartyResponse>, AppError> {
    Ok(Json(state.parties.update_party(id, payload).await?))
}

async fn delete_party(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    let outcome = state.parties.delete_party(id).await?;
    Ok(Json(DeleteResponse { deleted: outcome.was_deleted() }))
}
