//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Kasir POS                              │
//! │                                                                         │
//! │  Handler: Result<Json<T>, ApiError>                                    │
//! │         │                                                               │
//! │         ├── Bad JSON / path / query ──────────► VALIDATION_ERROR  400  │
//! │         ├── ValidationError ──────────────────► VALIDATION_ERROR  400  │
//! │         ├── NotFound / ProductNotFound ───────► NOT_FOUND         404  │
//! │         ├── InsufficientStock ────────────────► INSUFFICIENT_STOCK 409 │
//! │         ├── CategoryInUse ────────────────────► CONFLICT          409  │
//! │         ├── InvalidReference ─────────────────► INVALID_REFERENCE 422  │
//! │         ├── Pool exhausted / connection ──────► UNAVAILABLE       503  │
//! │         └── Any other persistence error ──────► DATABASE_ERROR    500  │
//! │                                                                         │
//! │  Persistence details are logged, never sent to the client.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kasir_core::{CoreError, ValidationError};
use kasir_db::DbError;
use serde::Serialize;

/// Error body returned to HTTP clients.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Kopi (id 7): available 3, requested 5"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Referenced row missing or deleted (422)
    InvalidReference,

    /// Checkout quantity above stock (409)
    InsufficientStock,

    /// Request conflicts with current state (409)
    Conflict,

    /// Datastore temporarily unavailable (503)
    Unavailable,

    /// Database operation failed (500)
    DatabaseError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidReference => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InsufficientStock | ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        if err.is_persistence() {
            // Log the actual error but return a generic message
            tracing::error!(error = %err, "Database operation failed");
        }

        match err {
            DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            DbError::InvalidReference { .. } => {
                ApiError::new(ErrorCode::InvalidReference, err.to_string())
            }
            DbError::CategoryInUse { .. } => ApiError::new(ErrorCode::Conflict, err.to_string()),
            DbError::ForeignKeyViolation { .. } => {
                ApiError::new(ErrorCode::InvalidReference, "Invalid reference")
            }
            DbError::ConnectionFailed(_) | DbError::PoolExhausted => {
                ApiError::new(ErrorCode::Unavailable, "Database unavailable")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::TransactionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::QueryFailed(_) | DbError::Internal(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Domain(core) => core.into(),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DbError::not_found("Product", 1), StatusCode::NOT_FOUND),
            (DbError::invalid_reference("Category", 2), StatusCode::UNPROCESSABLE_ENTITY),
            (
                DbError::CategoryInUse {
                    category_id: 1,
                    product_count: 3,
                },
                StatusCode::CONFLICT,
            ),
            (DbError::PoolExhausted, StatusCode::SERVICE_UNAVAILABLE),
            (DbError::QueryFailed("syntax".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                CoreError::ProductNotFound { product_id: 9 }.into(),
                StatusCode::NOT_FOUND,
            ),
            (
                CoreError::InsufficientStock {
                    product_id: 1,
                    product_name: "Kopi".into(),
                    available: 0,
                    requested: 1,
                }
                .into(),
                StatusCode::CONFLICT,
            ),
            (
                ValidationError::Required {
                    field: "items".into(),
                }
                .into(),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, status) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.code.status(), status, "{api}");
        }
    }

    #[test]
    fn test_persistence_message_is_generic() {
        let api: ApiError = DbError::QueryFailed("no such table: products".into()).into();
        assert_eq!(api.message, "Database operation failed");
    }

    #[test]
    fn test_serialization() {
        let api = ApiError::validation("quantity must be positive");
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "quantity must be positive");
    }
}
