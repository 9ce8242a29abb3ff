//! # kasir-core: Pure Business Logic for Kasir POS
//!
//! This crate holds the domain model of the Kasir POS backend as pure types
//! and functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    kasir-api (axum)                             │   │
//! │  │    /categories  /products  /checkout  /report/hari-ini          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  report   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ DateRange │  │   rules   │  │   │
//! │  │   │Transaction│  │ subtotals │  │ day math  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasir-db (Database Layer)                    │   │
//! │  │        SQLite queries, migrations, checkout, reports            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Category, Product, Transaction, SalesReport)
//! - [`money`] - Money type with checked integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//! - [`report`] - Report date ranges
//!
//! ## Example Usage
//!
//! ```rust
//! use kasir_core::money::Money;
//!
//! let unit_price = Money::new(1000);
//! let subtotal = unit_price.checked_mul_quantity(4).unwrap();
//!
//! assert_eq!(subtotal.amount(), 4000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::DateRange;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Name reported as best seller when no sale falls in the report range.
pub const NO_BEST_SELLER: &str = "-";

/// Maximum length of category and product names.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of free-text descriptions.
pub const MAX_DESCRIPTION_LEN: usize = 1000;
