//! # Transaction Repository
//!
//! Checkout: turns a cart into a persisted sale in one unit of work.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       checkout(items)                                   │
//! │                                                                         │
//! │  validate_checkout_items        (no datastore access on failure)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │       │                                                                 │
//! │       ▼  for each item, in order                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │ UPDATE products SET stock = stock - qty                          │  │
//! │  │ WHERE id = ? AND deleted_at IS NULL AND stock >= qty             │  │
//! │  │      │                                                           │  │
//! │  │      ├── 0 rows → product missing?   → ProductNotFound           │  │
//! │  │      │            otherwise          → InsufficientStock         │  │
//! │  │      │                                  (ROLLBACK)               │  │
//! │  │      ▼                                                           │  │
//! │  │ SELECT name, price → subtotal = price × qty, total += subtotal   │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT transactions (total_amount)                                    │
//! │  INSERT transaction_details × N (name snapshot)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! The decrement is a compare-and-swap: the stock check and the write are
//! the same statement. It is also the first statement of every item, so the
//! unit of work holds the SQLite write lock before it reads anything. A
//! second checkout blocks on that lock (busy timeout) and then sees the
//! committed stock. Two buyers of the last unit cannot both succeed.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use kasir_core::validation::validate_checkout_items;
use kasir_core::{
    CheckoutItem, CoreError, Money, Transaction, TransactionDetail, ValidationError,
};

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: i64,
    total_amount: Money,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct DetailRow {
    transaction_id: i64,
    product_id: i64,
    product_name: String,
    quantity: i64,
    subtotal: Money,
}

impl From<DetailRow> for TransactionDetail {
    fn from(row: DetailRow) -> Self {
        TransactionDetail {
            transaction_id: row.transaction_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            subtotal: row.subtotal,
        }
    }
}

/// A sold line before the transaction id is known.
struct SoldLine {
    product_id: i64,
    product_name: String,
    quantity: i64,
    subtotal: Money,
}

fn overflow(field: &str) -> DbError {
    ValidationError::Overflow {
        field: field.to_string(),
    }
    .into()
}

/// Repository for checkout and sale lookups.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Sells `items` atomically.
    ///
    /// ## Returns
    /// * `Ok(Transaction)` - committed sale, details in request order
    /// * `Err(DbError::Domain(CoreError::Validation(..)))` - empty cart,
    ///   non-positive quantity, money overflow
    /// * `Err(DbError::Domain(CoreError::ProductNotFound { .. }))`
    /// * `Err(DbError::Domain(CoreError::InsufficientStock { .. }))`
    /// * `Err(DbError::TransactionFailed)` - begin or commit failed
    ///
    /// On any error nothing is persisted.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // Product 1: stock 10, price 1000
    /// let sale = db.transactions().checkout(&[CheckoutItem::new(1, 4)]).await?;
    /// assert_eq!(sale.total_amount, Money::new(4000));
    /// // Product 1 stock is now 6
    /// ```
    pub async fn checkout(&self, items: &[CheckoutItem]) -> DbResult<Transaction> {
        validate_checkout_items(items)?;

        debug!(items = items.len(), "Starting checkout");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        match checkout_in(&mut *tx, items).await {
            Ok(transaction) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

                info!(
                    transaction_id = %transaction.id,
                    total = %transaction.total_amount,
                    lines = transaction.details.len(),
                    "Checkout committed"
                );
                Ok(transaction)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Checkout rollback failed");
                }
                warn!(error = %err, "Checkout rejected");
                Err(err)
            }
        }
    }

    /// Gets a persisted transaction with its details in insertion order.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such transaction
    pub async fn get_by_id(&self, id: i64) -> DbResult<Transaction> {
        debug!(id = %id, "Fetching transaction");

        let header: TransactionRow = sqlx::query_as(
            "SELECT id, total_amount, created_at FROM transactions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Transaction", id))?;

        let details: Vec<DetailRow> = sqlx::query_as(
            r#"
            SELECT transaction_id, product_id, product_name, quantity, subtotal
            FROM transaction_details
            WHERE transaction_id = ?1
            ORDER BY id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Transaction {
            id: header.id,
            total_amount: header.total_amount,
            created_at: header.created_at,
            details: details.into_iter().map(TransactionDetail::from).collect(),
        })
    }
}

/// Body of the checkout unit of work. The caller owns commit and rollback.
async fn checkout_in(conn: &mut SqliteConnection, items: &[CheckoutItem]) -> DbResult<Transaction> {
    let now = Utc::now();
    let mut total = Money::zero();
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        let decremented = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?1, updated_at = ?2
            WHERE id = ?3 AND deleted_at IS NULL AND stock >= ?1
            "#,
        )
        .bind(item.quantity)
        .bind(now)
        .bind(item.product_id)
        .execute(&mut *conn)
        .await?;

        if decremented.rows_affected() == 0 {
            return Err(rejection(conn, item).await?);
        }

        let (product_name, price): (String, Money) =
            sqlx::query_as("SELECT name, price FROM products WHERE id = ?1")
                .bind(item.product_id)
                .fetch_one(&mut *conn)
                .await?;

        let subtotal = price
            .checked_mul_quantity(item.quantity)
            .ok_or_else(|| overflow("subtotal"))?;
        total = total
            .checked_add(subtotal)
            .ok_or_else(|| overflow("total_amount"))?;

        debug!(
            product_id = %item.product_id,
            quantity = item.quantity,
            subtotal = %subtotal,
            "Reserved stock"
        );

        lines.push(SoldLine {
            product_id: item.product_id,
            product_name,
            quantity: item.quantity,
            subtotal,
        });
    }

    let transaction_id = sqlx::query(
        "INSERT INTO transactions (total_amount, created_at) VALUES (?1, ?2)",
    )
    .bind(total)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    let mut details = Vec::with_capacity(lines.len());
    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO transaction_details (
                transaction_id, product_id, product_name, quantity, subtotal
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(transaction_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.quantity)
        .bind(line.subtotal)
        .execute(&mut *conn)
        .await?;

        details.push(TransactionDetail {
            transaction_id,
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            subtotal: line.subtotal,
        });
    }

    Ok(Transaction {
        id: transaction_id,
        total_amount: total,
        created_at: now,
        details,
    })
}

/// Explains why the conditional decrement matched no row.
async fn rejection(conn: &mut SqliteConnection, item: &CheckoutItem) -> DbResult<DbError> {
    let row: Option<(String, i64)> =
        sqlx::query_as("SELECT name, stock FROM products WHERE id = ?1 AND deleted_at IS NULL")
            .bind(item.product_id)
            .fetch_optional(&mut *conn)
            .await?;

    let err = match row {
        None => CoreError::ProductNotFound {
            product_id: item.product_id,
        },
        Some((product_name, available)) => CoreError::InsufficientStock {
            product_id: item.product_id,
            product_name,
            available,
            requested: item.quantity,
        },
    };

    Ok(err.into())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::testing::{seed_category, seed_product, test_db};
    use std::path::PathBuf;

    async fn stock_of(db: &Database, id: i64) -> i64 {
        db.products().get_by_id(id).await.unwrap().product.stock
    }

    async fn row_counts(db: &Database) -> (i64, i64) {
        let transactions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let details: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transaction_details")
            .fetch_one(db.pool())
            .await
            .unwrap();
        (transactions, details)
    }

    #[tokio::test]
    async fn test_checkout_single_item() {
        let db = test_db().await;
        let category = seed_category(&db, "Minuman").await;
        let a = seed_product(&db, category.id, "Kopi", 1000, 10).await.product;

        let sale = db
            .transactions()
            .checkout(&[CheckoutItem::new(a.id, 4)])
            .await
            .unwrap();

        assert_eq!(sale.total_amount, Money::new(4000));
        assert_eq!(sale.details.len(), 1);
        assert_eq!(sale.details[0].quantity, 4);
        assert_eq!(sale.details[0].subtotal, Money::new(4000));
        assert_eq!(sale.details[0].product_name, "Kopi");
        assert_eq!(sale.details[0].transaction_id, sale.id);

        assert_eq!(stock_of(&db, a.id).await, 6);
        assert_eq!(row_counts(&db).await, (1, 1));
    }

    #[tokio::test]
    async fn test_checkout_multiple_items_keeps_order() {
        let db = test_db().await;
        let category = seed_category(&db, "Campur").await;
        let teh = seed_product(&db, category.id, "Teh", 3000, 5).await.product;
        let roti = seed_product(&db, category.id, "Roti", 8000, 2).await.product;

        let sale = db
            .transactions()
            .checkout(&[CheckoutItem::new(roti.id, 2), CheckoutItem::new(teh.id, 3)])
            .await
            .unwrap();

        assert_eq!(sale.total_amount, Money::new(2 * 8000 + 3 * 3000));
        let names: Vec<&str> = sale.details.iter().map(|d| d.product_name.as_str()).collect();
        assert_eq!(names, vec!["Roti", "Teh"]);

        assert_eq!(stock_of(&db, roti.id).await, 0);
        assert_eq!(stock_of(&db, teh.id).await, 2);

        let stored = db.transactions().get_by_id(sale.id).await.unwrap();
        assert_eq!(stored, sale);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let db = test_db().await;
        let category = seed_category(&db, "Campur").await;
        let teh = seed_product(&db, category.id, "Teh", 3000, 5).await.product;
        let roti = seed_product(&db, category.id, "Roti", 8000, 2).await.product;

        let err = db
            .transactions()
            .checkout(&[CheckoutItem::new(teh.id, 1), CheckoutItem::new(roti.id, 3)])
            .await
            .unwrap_err();

        match err {
            DbError::Domain(CoreError::InsufficientStock {
                product_id,
                product_name,
                available,
                requested,
            }) => {
                assert_eq!(product_id, roti.id);
                assert_eq!(product_name, "Roti");
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // The first line's decrement is undone too.
        assert_eq!(stock_of(&db, teh.id).await, 5);
        assert_eq!(stock_of(&db, roti.id).await, 2);
        assert_eq!(row_counts(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn test_overflow_rolls_back_earlier_lines() {
        let db = test_db().await;
        let category = seed_category(&db, "Campur").await;
        let cheap = seed_product(&db, category.id, "Permen", 500, 5).await.product;
        let big = seed_product(&db, category.id, "Emas", i64::MAX / 2 + 1, 5).await.product;

        let err = db
            .transactions()
            .checkout(&[CheckoutItem::new(cheap.id, 1), CheckoutItem::new(big.id, 2)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Overflow { ref field }))
                if field == "subtotal"
        ));
        assert_eq!(stock_of(&db, cheap.id).await, 5);
        assert_eq!(stock_of(&db, big.id).await, 5);
        assert_eq!(row_counts(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn test_unknown_product_has_no_side_effects() {
        let db = test_db().await;
        let category = seed_category(&db, "Campur").await;
        let teh = seed_product(&db, category.id, "Teh", 3000, 5).await.product;

        let err = db
            .transactions()
            .checkout(&[CheckoutItem::new(teh.id, 1), CheckoutItem::new(999, 1)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductNotFound { product_id: 999 })
        ));
        assert_eq!(stock_of(&db, teh.id).await, 5);
        assert_eq!(row_counts(&db).await, (0, 0));
    }

    #[tokio::test]
    async fn test_deleted_product_cannot_be_sold() {
        let db = test_db().await;
        let category = seed_category(&db, "Campur").await;
        let teh = seed_product(&db, category.id, "Teh", 3000, 5).await.product;
        db.products().delete(teh.id).await.unwrap();

        let err = db
            .transactions()
            .checkout(&[CheckoutItem::new(teh.id, 1)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_cart_is_rejected_before_any_write() {
        let db = test_db().await;
        let category = seed_category(&db, "Campur").await;
        let teh = seed_product(&db, category.id, "Teh", 3000, 5).await.product;

        let empty = db.transactions().checkout(&[]).await.unwrap_err();
        assert!(matches!(empty, DbError::Domain(CoreError::Validation(_))));

        let zero = db
            .transactions()
            .checkout(&[CheckoutItem::new(teh.id, 0)])
            .await
            .unwrap_err();
        assert!(matches!(zero, DbError::Domain(CoreError::Validation(_))));

        assert_eq!(stock_of(&db, teh.id).await, 5);
    }

    #[tokio::test]
    async fn test_repeated_product_lines_accumulate() {
        let db = test_db().await;
        let category = seed_category(&db, "Campur").await;
        let teh = seed_product(&db, category.id, "Teh", 3000, 5).await.product;

        let err = db
            .transactions()
            .checkout(&[CheckoutItem::new(teh.id, 3), CheckoutItem::new(teh.id, 3)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 2, .. })
        ));
        assert_eq!(stock_of(&db, teh.id).await, 5);

        let sale = db
            .transactions()
            .checkout(&[CheckoutItem::new(teh.id, 2), CheckoutItem::new(teh.id, 3)])
            .await
            .unwrap();
        assert_eq!(sale.total_amount, Money::new(15000));
        assert_eq!(stock_of(&db, teh.id).await, 0);
    }

    #[tokio::test]
    async fn test_detail_keeps_name_at_time_of_sale() {
        let db = test_db().await;
        let category = seed_category(&db, "Campur").await;
        let teh = seed_product(&db, category.id, "Teh", 3000, 5).await.product;

        let sale = db
            .transactions()
            .checkout(&[CheckoutItem::new(teh.id, 1)])
            .await
            .unwrap();

        db.products()
            .update(
                teh.id,
                &kasir_core::ProductPatch {
                    name: Some("Teh Tarik".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = db.transactions().get_by_id(sale.id).await.unwrap();
        assert_eq!(stored.details[0].product_name, "Teh");
    }

    #[tokio::test]
    async fn test_get_missing_transaction() {
        let db = test_db().await;
        assert!(matches!(
            db.transactions().get_by_id(1).await,
            Err(DbError::NotFound { .. })
        ));
    }

    // =========================================================================
    // Concurrency (file database, several connections)
    // =========================================================================

    struct ScratchDb {
        path: PathBuf,
    }

    impl ScratchDb {
        fn new() -> Self {
            let path = std::env::temp_dir().join(format!("kasir-test-{}.db", uuid::Uuid::new_v4()));
            ScratchDb { path }
        }

        async fn open(&self) -> Database {
            Database::new(DbConfig::new(&self.path).max_connections(8))
                .await
                .unwrap()
        }
    }

    impl Drop for ScratchDb {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let mut file = self.path.clone().into_os_string();
                file.push(suffix);
                let _ = std::fs::remove_file(file);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_of_last_units() {
        let scratch = ScratchDb::new();
        let db = scratch.open().await;
        let category = seed_category(&db, "Campur").await;
        let kopi = seed_product(&db, category.id, "Kopi", 1000, 5).await.product;

        let first = {
            let db = db.clone();
            tokio::spawn(async move {
                db.transactions()
                    .checkout(&[CheckoutItem::new(kopi.id, 5)])
                    .await
            })
        };
        let second = {
            let db = db.clone();
            tokio::spawn(async move {
                db.transactions()
                    .checkout(&[CheckoutItem::new(kopi.id, 5)])
                    .await
            })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(succeeded, 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(DbError::Domain(CoreError::InsufficientStock { available: 0, .. }))
        )));

        assert_eq!(stock_of(&db, kopi.id).await, 0);
        assert_eq!(row_counts(&db).await, (1, 1));

        db.close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_buyers_never_oversell() {
        let scratch = ScratchDb::new();
        let db = scratch.open().await;
        let category = seed_category(&db, "Campur").await;
        let kopi = seed_product(&db, category.id, "Kopi", 1000, 5).await.product;

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move {
                    db.transactions()
                        .checkout(&[CheckoutItem::new(kopi.id, 1)])
                        .await
                })
            })
            .collect();

        let mut sold = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => sold += 1,
                Err(DbError::Domain(CoreError::InsufficientStock { .. })) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(sold, 5);
        assert_eq!(stock_of(&db, kopi.id).await, 0);
        assert_eq!(row_counts(&db).await, (5, 5));

        db.close().await;
    }
}
