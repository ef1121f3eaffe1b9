use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabletop_runtime::TabletopError;

/// Body shape for every error, and for handlers that answer with a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericResponse {
    pub status: u16,
    pub message: String,
    pub data: serde_json::Value,
}

impl GenericResponse {
    pub fn new(status: StatusCode, message: &str, data: serde_json::Value) -> Self {
        Self {
            status: status.as_u16(),
            message: message.to_string(),
            data,
        }
    }
}

impl IntoResponse for GenericResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[derive(Debug)]
pub struct AppError(pub StatusCode, pub anyhow::Error);

impl AppError {
    pub fn new(status: StatusCode, err: anyhow::Error) -> Self {
        Self(status, err)
    }

    pub fn unauthorized(message: &str) -> Self {
        Self(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message.to_string()))
    }
}

/// Maps a service error to its HTTP status. Errors that are not a
/// `TabletopError` are treated as bad input.
pub fn status_for(err: &anyhow::Error) -> StatusCode {
    match err.downcast_ref::<TabletopError>() {
        Some(TabletopError::NotFound { .. }) => StatusCode::NOT_FOUND,
        Some(TabletopError::Conflict(_)) => StatusCode::CONFLICT,
        Some(TabletopError::InvalidReference(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(TabletopError::Validation(_)) => StatusCode::BAD_REQUEST,
        Some(TabletopError::Transient(_)) => StatusCode::SERVICE_UNAVAILABLE,
        Some(TabletopError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        None => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("CODE: {}, MESSAGE: {:#}", self.0.as_u16(), self.1);

        // Driver detail stays in the log.
        let message = match self.0 {
            StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable, retry later".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.1.to_string(),
        };
        GenericResponse::new(self.0, &message, json!({})).into_response()
    }
}

// Lets handlers use `?` on service results; the status follows the error kind.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self(status_for(&err), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: TabletopError) -> StatusCode {
        AppError::from(err).0
    }

    #[test]
    fn service_errors_map_to_statuses() {
        assert_eq!(status_of(TabletopError::not_found("System", "x")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(TabletopError::Conflict("dup".into())), StatusCode::CONFLICT);
        assert_eq!(status_of(TabletopError::invalid_reference("party")), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_of(TabletopError::validation("name")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(TabletopError::Transient("pool".into())), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_of(TabletopError::Internal("boom".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn foreign_errors_are_bad_requests() {
        let err: AppError = "not a uuid".parse::<i32>().unwrap_err().into();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn server_errors_hide_driver_detail() {
        let response = AppError::from(TabletopError::Internal("relation \"x\" does not exist".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: GenericResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.status, 500);
        assert_eq!(body.message, "Internal server error");
    }

    #[tokio::test]
    async fn client_errors_keep_their_message() {
        let response = AppError::from(TabletopError::Conflict("a system named 'X' already exists".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: GenericResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.message, "conflict: a system named 'X' already exists");
    }
}
