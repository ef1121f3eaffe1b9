use axum::extract::Request;
use axum::http::header;
use tracing_subscriber::EnvFilter;

use crate::response::AppError;

pub fn extract_bearer_token(req: &Request) -> Result<String, AppError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("invalid authorization header"))?;

    let parts = value.split_whitespace().collect::<Vec<_>>();
    match parts.as_slice() {
        ["Bearer", token] => Ok(token.to_string()),
        _ => Err(AppError::unauthorized("invalid authorization header")),
    }
}

/// Installs the global subscriber; `RUST_LOG` overrides the `info` default.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("global tracing subscriber already set");
    }
}
