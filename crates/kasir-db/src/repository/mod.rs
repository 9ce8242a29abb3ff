//! # Repository Module
//!
//! Database repository implementations for Kasir POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  axum handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().get_by_id(7)                                    │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list(&self, name_filter)                                          │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── create(&self, input)                                              │
//! │  ├── update(&self, id, patch)                                          │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Soft Delete Filter
//! Every read and every write in this module carries
//! `deleted_at IS NULL` for categories and products. A soft-deleted row
//! behaves exactly like a missing one.
//!
//! ## Available Repositories
//!
//! - [`category::CategoryRepository`] - Category CRUD
//! - [`product::ProductRepository`] - Product CRUD with category summary
//! - [`transaction::TransactionRepository`] - Checkout and sale lookup
//! - [`report::ReportRepository`] - Sales aggregation

pub mod category;
pub mod product;
pub mod report;
pub mod transaction;
