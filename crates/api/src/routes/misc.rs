use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::response::GenericResponse;
use crate::GlobalState;

pub fn misc_routes() -> Router<GlobalState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<GlobalState>) -> Response {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => Json(json!({ "status": "healthy", "database": "connected" })).into_response(),
        Err(e) => {
            tracing::error!("[/health] database check failed: {:?}", e);
            GenericResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Database error: {}", e),
                json!({}),
            )
            .into_response()
        }
    }
}
