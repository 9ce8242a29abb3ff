//! # Report Repository
//!
//! Read-only sales aggregation over a date range.
//!
//! ## Report Computation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  range = [start, end)  (UTC instants from DateRange)                   │
//! │                                                                         │
//! │  transactions in range ──► SUM(total_amount)  → total_revenue          │
//! │                        └─► COUNT(*)           → total_transaksi        │
//! │                                                                         │
//! │  details ⋈ transactions in range ⋈ products                            │
//! │       GROUP BY product_id                                              │
//! │       ORDER BY SUM(quantity) DESC, product_id ASC                      │
//! │       LIMIT 1                               → produk_terlaris          │
//! │                                                                         │
//! │  no rows → { nama: "-", qty_terjual: 0 }                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both queries run in one read transaction so they see the same snapshot.

use chrono::{NaiveDate, TimeZone};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasir_core::{BestSellingProduct, DateRange, Money, SalesReport};

/// Repository for sales reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Report for the current calendar day in `tz`.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let today = db.reports().daily(&chrono::Local).await?;
    /// println!("{} from {} sales", today.total_revenue, today.total_transaction_count);
    /// ```
    pub async fn daily<Tz: TimeZone>(&self, tz: &Tz) -> DbResult<SalesReport> {
        let range = DateRange::today(tz)?;
        self.for_range(range).await
    }

    /// Report over the inclusive local dates `start..=end` in `tz`.
    ///
    /// ## Returns
    /// * `Err(DbError::Domain(..))` - `start` is after `end`
    pub async fn for_dates<Tz: TimeZone>(
        &self,
        tz: &Tz,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<SalesReport> {
        let range = DateRange::for_dates(tz, start, end)?;
        self.for_range(range).await
    }

    /// Report over an explicit instant range.
    pub async fn for_range(&self, range: DateRange) -> DbResult<SalesReport> {
        debug!(start = %range.start, end = %range.end, "Building sales report");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let (total_revenue, total_transaction_count): (Money, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount), 0), COUNT(*)
            FROM transactions
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&mut *tx)
        .await?;

        let best: Option<(String, i64)> = sqlx::query_as(
            r#"
            SELECT p.name, SUM(td.quantity) AS quantity_sold
            FROM transaction_details td
            INNER JOIN transactions t ON t.id = td.transaction_id
            INNER JOIN products p ON p.id = td.product_id
            WHERE t.created_at >= ?1 AND t.created_at < ?2
            GROUP BY td.product_id
            ORDER BY quantity_sold DESC, td.product_id ASC
            LIMIT 1
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let best_selling_product = best
            .map(|(name, quantity_sold)| BestSellingProduct {
                name,
                quantity_sold,
            })
            .unwrap_or_else(BestSellingProduct::none);

        debug!(
            revenue = %total_revenue,
            count = total_transaction_count,
            "Sales report ready"
        );

        Ok(SalesReport {
            total_revenue,
            total_transaction_count,
            best_selling_product,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
