use axum::body::Body;
use axum::middleware::Next;
use axum::{extract::Request, response::Response};

use crate::response::AppError;
use crate::utils::extract_bearer_token;

/// Opaque id of the calling user, issued and verified upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Rejects requests without a bearer token and exposes the caller as an
/// `Extension<UserId>`.
pub async fn authenticate(mut req: Request, next: Next) -> Result<Response<Body>, AppError> {
    let token = extract_bearer_token(&req)?;
    if token.trim().is_empty() {
        return Err(AppError::unauthorized("empty bearer token"));
    }

    req.extensions_mut().insert(UserId(token));
    Ok(next.run(req).await)
}
