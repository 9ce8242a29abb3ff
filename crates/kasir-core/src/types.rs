//! # Domain Types
//!
//! Core domain types used throughout Kasir POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Category     │◄──│    Product      │   │    Transaction      │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id             │   │  id             │   │  id                 │   │
//! │  │  name           │   │  price (Money)  │   │  total_amount       │   │
//! │  │  status         │   │  stock          │   │  details ──────┐    │   │
//! │  └─────────────────┘   │  category_id    │   └────────────────┼────┘   │
//! │                        │  status         │                    ▼        │
//! │                        └─────────────────┘   ┌─────────────────────┐   │
//! │                                              │ TransactionDetail   │   │
//! │  ┌─────────────────┐   ┌─────────────────┐   │ product_name (snap) │   │
//! │  │  RecordStatus   │   │  SalesReport    │   │ quantity, subtotal  │   │
//! │  │  Active         │   │  revenue, count │   └─────────────────────┘   │
//! │  │  Deleted { at } │   │  best seller    │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Soft Delete
//! Categories and products are never purged. The database keeps a nullable
//! `deleted_at` column; at this layer it is a [`RecordStatus`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::NO_BEST_SELLER;

// =============================================================================
// Record Status
// =============================================================================

/// Lifecycle of a soft-deletable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordStatus {
    /// Visible to every read.
    #[default]
    Active,
    /// Logically removed; retained for referential history.
    Deleted { at: DateTime<Utc> },
}

impl RecordStatus {
    /// Builds the status from the nullable `deleted_at` column.
    pub fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            Some(at) => RecordStatus::Deleted { at },
            None => RecordStatus::Active,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, RecordStatus::Active)
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Never serialized; reads only return active categories.
    #[serde(skip)]
    pub status: RecordStatus,
}

impl Category {
    /// Merges a patch onto this category. Absent fields keep their value.
    pub fn apply(&self, patch: &CategoryPatch) -> Category {
        Category {
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            description: patch
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            ..self.clone()
        }
    }
}

/// Input for creating a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update for a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// The slice of a category embedded in product reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Unit price in currency units.
    pub price: Money,
    /// Units on hand. Never negative.
    pub stock: i64,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub status: RecordStatus,
}

impl Product {
    /// Merges a patch onto this product. Absent fields keep their value.
    pub fn apply(&self, patch: &ProductPatch) -> Product {
        Product {
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            description: patch
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            price: patch.price.unwrap_or(self.price),
            stock: patch.stock.unwrap_or(self.stock),
            category_id: patch.category_id.unwrap_or(self.category_id),
            ..self.clone()
        }
    }
}

/// A product together with its category, as returned by product reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    pub category: CategorySummary,
}

/// Input for creating a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub category_id: i64,
}

/// Partial update for a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
    pub category_id: Option<i64>,
}

// =============================================================================
// Checkout
// =============================================================================

/// One line of a checkout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: i64,
    pub quantity: i64,
}

impl CheckoutItem {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        CheckoutItem {
            product_id,
            quantity,
        }
    }
}

/// A committed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// Σ detail subtotals.
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    /// One entry per checkout item, in request order.
    pub details: Vec<TransactionDetail>,
}

/// A line item of a transaction.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub transaction_id: i64,
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// unit_price × quantity at time of sale.
    pub subtotal: Money,
}

// =============================================================================
// Reporting
// =============================================================================

/// Best-selling product over a report range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestSellingProduct {
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "qty_terjual")]
    pub quantity_sold: i64,
}

impl BestSellingProduct {
    /// Placeholder used when the range has no sales.
    pub fn none() -> Self {
        BestSellingProduct {
            name: NO_BEST_SELLER.to_string(),
            quantity_sold: 0,
        }
    }
}

/// Aggregated sales over a date range. Derived, never persisted.
///
/// ## Wire Format
/// ```json
/// {
///   "total_revenue": 45000,
///   "total_transaksi": 5,
///   "produk_terlaris": { "nama": "Kopi Susu", "qty_terjual": 12 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReport {
    pub total_revenue: Money,
    #[serde(rename = "total_transaksi")]
    pub total_transaction_count: i64,
    #[serde(rename = "produk_terlaris")]
    pub best_selling_product: BestSellingProduct,
}

impl SalesReport {
    /// Report for a range without any transaction.
    pub fn empty() -> Self {
        SalesReport {
            total_revenue: Money::zero(),
            total_transaction_count: 0,
            best_selling_product: BestSellingProduct::none(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
