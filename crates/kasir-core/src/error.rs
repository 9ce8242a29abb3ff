//! # Error Types
//!
//! Domain-specific error types for kasir-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasir-core errors (this file)                                         │
//! │  ├── CoreError        - Checkout failures (missing product, stock)     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kasir-db errors (separate crate)                                      │
//! │  └── DbError          - NotFound, InvalidReference, persistence        │
//! │                                                                         │
//! │  kasir-api errors (in app)                                             │
//! │  └── ApiError         - What HTTP clients see (status + JSON)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised while converting a cart into a sale.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A checkout item references a product that does not exist or was
    /// soft-deleted.
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: i64 },

    /// Requested quantity exceeds the stock observed inside the checkout.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout [{ product_id: 7, quantity: 5 }]
    ///      │
    ///      ▼
    /// Conditional decrement matches no row (stock = 3)
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, product_name: "Kopi", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Whole checkout rolled back
    /// ```
    #[error(
        "Insufficient stock for {product_name} (id {product_id}): available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: i64,
        product_name: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements and are raised
/// before any datastore access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Arithmetic on the value overflowed the money range.
    #[error("{field} is too large")]
    Overflow { field: String },

    /// A range whose bounds are inconsistent.
    #[error("{field} is invalid: {reason}")]
    InvalidRange { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
