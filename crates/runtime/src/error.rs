use thiserror::Error;

/// Outcomes the store and service layers report to callers.
///
/// `Transient` and `Internal` carry driver detail for logging only; the HTTP
/// boundary replaces it with a generic message.
#[derive(Debug, Error)]
pub enum TabletopError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("transient store failure: {0}")]
    Transient(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, TabletopError>;

impl TabletopError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_reference(message: impl ToString) -> Self {
        Self::InvalidReference(message.to_string())
    }

    pub fn validation(message: impl ToString) -> Self {
        Self::Validation(message.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Only transient failures are safe to retry as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Classifies a PostgreSQL SQLSTATE code.
    pub fn from_sqlstate(code: &str, detail: impl ToString) -> Self {
        let detail = detail.to_string();
        match code {
            "23505" => Self::Conflict(detail),
            "23503" => Self::InvalidReference(detail),
            "23502" | "23514" | "22P02" | "22003" => Self::Validation(detail),
            "40001" | "40P01" | "57P01" | "57014" => Self::Transient(detail),
            c if c.starts_with("08") => Self::Transient(detail),
            _ => Self::Internal(detail),
        }
    }
}

impl From<sqlx::Error> for TabletopError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("record", "unknown"),
            sqlx::Error::Database(db_err) => {
                let detail = match db_err.constraint() {
                    Some(constraint) => format!("{} ({})", db_err.message(), constraint),
                    None => db_err.message().to_string(),
                };
                match db_err.code() {
                    Some(code) => Self::from_sqlstate(&code, detail),
                    None => Self::Internal(detail),
                }
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => Self::Transient(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlstate_classification() {
        assert!(matches!(TabletopError::from_sqlstate("23505", "dup"), TabletopError::Conflict(_)));
        assert!(matches!(
            TabletopError::from_sqlstate("23503", "fk"),
            TabletopError::InvalidReference(_)
        ));
        for code in ["23502", "23514", "22P02", "22003"] {
            assert!(matches!(TabletopError::from_sqlstate(code, ""), TabletopError::Validation(_)));
        }
        for code in ["40001", "40P01", "08006", "08001", "57P01"] {
            assert!(TabletopError::from_sqlstate(code, "").is_retryable());
        }
        assert!(matches!(TabletopError::from_sqlstate("42P01", ""), TabletopError::Internal(_)));
    }

    #[test]
    fn driver_errors_map_to_kinds() {
        assert!(TabletopError::from(sqlx::Error::RowNotFound).is_not_found());
        assert!(TabletopError::from(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(TabletopError::from(sqlx::Error::PoolClosed).is_retryable());
        assert!(matches!(
            TabletopError::from(sqlx::Error::ColumnNotFound("quantity".into())),
            TabletopError::Internal(_)
        ));
    }

    #[test]
    fn not_found_names_entity_and_id() {
        let err = TabletopError::not_found("System", "42");
        assert_eq!(err.to_string(), "System not found: 42");
    }
}
