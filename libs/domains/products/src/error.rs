use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProductError {
    /// Input failed validation. `field` names the offending attribute when known.
    #[error("Invalid input: {message}")]
    InvalidInput {
        field: Option<&'static str>,
        message: String,
    },

    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Product already exists: {0}")]
    AlreadyExists(Uuid),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used at the HTTP boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Conflict,
    Internal,
}

impl ProductError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ProductError::InvalidInput {
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProductError::InvalidInput { .. } => ErrorKind::InvalidInput,
            ProductError::NotFound(_) => ErrorKind::NotFound,
            ProductError::AlreadyExists(_) => ErrorKind::Conflict,
            ProductError::Database(_) | ProductError::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::InvalidInput { field, message } => AppError::Validation {
                field: field.map(str::to_string),
                message,
            },
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::AlreadyExists(id) => {
                AppError::Conflict(format!("Product {} already exists", id))
            }
            ProductError::Database(msg) => AppError::InternalServerError(msg),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<DbErr> for ProductError {
    fn from(err: DbErr) -> Self {
        ProductError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            ProductError::invalid("price", "negative").kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(ProductError::NotFound(Uuid::nil()).kind(), ErrorKind::NotFound);
        assert_eq!(
            ProductError::AlreadyExists(Uuid::nil()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ProductError::Database("boom".into()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ProductError::invalid("name", "required"), StatusCode::BAD_REQUEST),
            (ProductError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (ProductError::AlreadyExists(Uuid::nil()), StatusCode::CONFLICT),
            (
                ProductError::Database("timeout".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ProductError::Internal("bug".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_db_error_becomes_database_variant() {
        let err: ProductError = DbErr::Custom("connection reset".into()).into();
        assert!(matches!(err, ProductError::Database(msg) if msg.contains("connection reset")));
    }
}
