use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{middleware, Extension, Json, Router};
use sqlx::types::Uuid;
use tabletop_runtime::wire::{ChangeLogQuery, ChangeLogResponse};

use crate::middleware::{authenticate, UserId};
use crate::response::AppError;
use crate::GlobalState;

pub fn change_log_routes() -> Router<GlobalState> {
    Router::new()
        .route("/change-log", get(list_change_logs))
        .route("/change-log/mine",
            get(list_my_change_logs)
            .route_layer(middleware::from_fn(authenticate))
        )
        .route("/change-log/{id}", get(get_change_log))
}

async fn list_change_logs(
    State(state): State<GlobalState>,
    Query(query): Query<ChangeLogQuery>,
) -> Result<Json<Vec<ChangeLogResponse>>, AppError> {
    Ok(Json(state.change_logs.list_change_logs(query).await?))
}

async fn list_my_change_logs(
    State(state): State<GlobalState>,
    Extension(user): Extension<UserId>,
    Query(mut query): Query<ChangeLogQuery>,
) -> Result<Json<Vec<ChangeLogResponse>>, AppError> {
    query.user_id = Some(user.0);
    Ok(Json(state.change_logs.list_change_logs(query).await?))
}

async fn get_change_log(
    State(state): State<GlobalState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChangeLogResponse>, AppError> {
    Ok(Json(state.change_logs.get_change_log(id).await?))
}
