use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use sqlx::types::Uuid;
use tabletop_runtime::wire::{DeleteResponse, SystemCreate, SystemQuery, SystemResponse, SystemUpdate};

use crate::response::AppError;
use crate::GlobalState;

pub fn system_routes() -> Router<GlobalState> {
    Router::new()
        .route("/system/add-system", post(add_system))
        .route("/system", get(list_systems))
        .route("/system/by-name/{name}", get(get_system_by_name))
        .route("/system/{id}",
            get(get_system)
            .put(update_system)
            .delete(delete_system)
        )
}

async fn add_system(
    State(state): State<GlobalState>,
    Json(payload): Json<SystemCreate>,
) -> Result<(StatusCode, Json<SystemResponse>), AppError> {
    let system = state.systems.add_system(payload).await?;
    Ok((StatusCode::CREATED, Json(system)))
}

/// `?name=` switches to a case-insensitive search.
async fn list_systems(
    State(state): State<GlobalState>,
    Query(query): Query<SystemQuery>,
) -> Result<Json<Vec<SystemResponse>>, AppError> {
    let systems = match query.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(fragment) => state.systems.search_systems(fragment).await?,
        None => state.systems.list_systems().await?,
    };
    Ok(Json(systems))
}

async fn get_system_by_name(
    State(state): State<GlobalState>,
    Path(name): Path<String>,
) -> Result<Json<SystemResponse>, AppError> {
    Ok(Json(state.systems.find_system_by_name(&name).await?))
}

async fn get_system(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SystemResponse>, AppError> {
    Ok(Json(state.systems.get_system(id).await?))
}

async fn update_system(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SystemUpdate>,
) -> Result<Json<SystemResponse>, AppError> {
    Ok(Json(state.systems.update_system(id, payload).await?))
}

async fn delete_system(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    let outcome = state.systems.delete_system(id).await?;
    Ok(Json(DeleteResponse { deleted: outcome.was_deleted() }))
}
