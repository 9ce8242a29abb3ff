//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with soft delete
//! - Case-insensitive name filter
//! - Category reference checks folded into the write statement
//!
//! ## Category Reference Check
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /products { category_id: 9, ... }                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO products (...)                                            │
//! │  SELECT ... FROM categories WHERE id = 9 AND deleted_at IS NULL        │
//! │       │                                                                 │
//! │       ├── 1 row  → created                                             │
//! │       └── 0 rows → InvalidReference { Category, 9 }                    │
//! │                                                                         │
//! │  Check and write are one statement: a concurrent category delete       │
//! │  cannot slip in between.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasir_core::validation::{validate_new_product, validate_product};
use kasir_core::{
    CategorySummary, Money, NewProduct, Product, ProductPatch, ProductWithCategory, RecordStatus,
};

/// `products` row joined with its category name.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: Money,
    stock: i64,
    category_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    category_name: String,
}

impl From<ProductRow> for ProductWithCategory {
    fn from(row: ProductRow) -> Self {
        ProductWithCategory {
            category: CategorySummary {
                id: row.category_id,
                name: row.category_name,
            },
            product: Product {
                id: row.id,
                name: row.name,
                description: row.description,
                price: row.price,
                stock: row.stock,
                category_id: row.category_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
                status: RecordStatus::from_deleted_at(row.deleted_at),
            },
        }
    }
}

const SELECT_PRODUCT: &str = r#"
    SELECT
        p.id,
        p.name,
        p.description,
        p.price,
        p.stock,
        p.category_id,
        p.created_at,
        p.updated_at,
        p.deleted_at,
        c.name AS category_name
    FROM products p
    INNER JOIN categories c ON c.id = p.category_id
    WHERE p.deleted_at IS NULL
"#;

/// Escapes LIKE wildcards so user input matches literally.
fn like_pattern(filter: &str) -> String {
    let mut escaped = String::with_capacity(filter.len() + 2);
    escaped.push('%');
    for ch in filter.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let all = repo.list(None).await?;
/// let kopi = repo.list(Some("kopi")).await?;
/// let one = repo.get_by_id(7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists live products ordered by id, each with its category.
    ///
    /// ## Arguments
    /// * `name_filter` - case-insensitive substring of the product name;
    ///   `None` or blank returns everything
    pub async fn list(&self, name_filter: Option<&str>) -> DbResult<Vec<ProductWithCategory>> {
        let filter = name_filter.map(str::trim).filter(|f| !f.is_empty());

        debug!(filter = ?filter, "Listing products");

        let rows: Vec<ProductRow> = match filter {
            Some(filter) => {
                let sql = format!("{SELECT_PRODUCT} AND p.name LIKE ?1 ESCAPE '\\' ORDER BY p.id");
                sqlx::query_as(&sql)
                    .bind(like_pattern(filter))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{SELECT_PRODUCT} ORDER BY p.id");
                sqlx::query_as(&sql).fetch_all(&self.pool).await?
            }
        };

        debug!(count = rows.len(), "Listed products");
        Ok(rows.into_iter().map(ProductWithCategory::from).collect())
    }

    /// Gets a live product by id.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - absent or soft-deleted
    pub async fn get_by_id(&self, id: i64) -> DbResult<ProductWithCategory> {
        let sql = format!("{SELECT_PRODUCT} AND p.id = ?1");

        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProductWithCategory::from)
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a new product under a live category.
    ///
    /// ## Returns
    /// * `Err(DbError::Domain(..))` - input fails validation
    /// * `Err(DbError::InvalidReference)` - category absent or deleted
    pub async fn create(&self, input: &NewProduct) -> DbResult<ProductWithCategory> {
        validate_new_product(input)?;

        debug!(name = %input.name, category_id = %input.category_id, "Inserting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, description, price, stock, category_id, created_at, updated_at
            )
            SELECT ?1, ?2, ?3, ?4, c.id, ?5, ?5
            FROM categories c
            WHERE c.id = ?6 AND c.deleted_at IS NULL
            "#,
        )
        .bind(input.name.trim())
        .bind(input.description.as_deref().unwrap_or_default())
        .bind(input.price)
        .bind(input.stock)
        .bind(now)
        .bind(input.category_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::invalid_reference("Category", input.category_id));
        }

        self.get_by_id(result.last_insert_rowid()).await
    }

    /// Merges `patch` onto a live product.
    ///
    /// Absent fields are left to the row's current value inside the UPDATE,
    /// so a patch that omits `stock` never overwrites a concurrent checkout's
    /// decrement.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - absent or soft-deleted
    /// * `Err(DbError::InvalidReference)` - new category absent or deleted
    /// * `Err(DbError::Domain(..))` - merged product fails validation
    pub async fn update(&self, id: i64, patch: &ProductPatch) -> DbResult<ProductWithCategory> {
        debug!(id = %id, "Updating product");

        let current = self.get_by_id(id).await?;
        validate_product(&current.product.apply(patch))?;

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                price = COALESCE(?4, price),
                stock = COALESCE(?5, stock),
                category_id = COALESCE(?6, category_id),
                updated_at = ?7
            WHERE id = ?1
              AND deleted_at IS NULL
              AND (?6 IS NULL OR EXISTS (
                  SELECT 1 FROM categories WHERE id = ?6 AND deleted_at IS NULL
              ))
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.description.as_deref())
        .bind(patch.price)
        .bind(patch.stock)
        .bind(patch.category_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either the product vanished or the category did.
            let live: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM products WHERE id = ?1 AND deleted_at IS NULL",
            )
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

            return Err(match (live, patch.category_id) {
                (0, _) | (_, None) => DbError::not_found("Product", id),
                (_, Some(category_id)) => DbError::invalid_reference("Category", category_id),
            });
        }

        self.get_by_id(id).await
    }

    /// Soft-deletes a product. Past transaction details keep pointing at it.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - absent or already deleted
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET deleted_at = ?2, updated_at = ?2
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts live products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{seed_category, seed_product, test_db};
    use kasir_core::{CoreError, ValidationError};

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("kopi"), "%kopi%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    async fn test_create_embeds_category() {
        let db = test_db().await;
        let category = seed_category(&db, "Minuman").await;

        let created = seed_product(&db, category.id, "Kopi Susu", 18000, 12).await;

        assert_eq!(created.product.name, "Kopi Susu");
        assert_eq!(created.product.price, Money::new(18000));
        assert_eq!(created.product.stock, 12);
        assert_eq!(created.category.name, "Minuman");
        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_with_missing_category_is_invalid_reference() {
        let db = test_db().await;

        let err = db
            .products()
            .create(&NewProduct {
                name: "Kopi".to_string(),
                description: None,
                price: Money::new(1000),
                stock: 1,
                category_id: 42,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::InvalidReference { id: 42, .. }));
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_with_deleted_category_is_invalid_reference() {
        let db = test_db().await;
        let category = seed_category(&db, "Lama").await;
        db.categories().delete(category.id).await.unwrap();

        let err = db
            .products()
            .create(&NewProduct {
                name: "Kopi".to_string(),
                description: None,
                price: Money::new(1000),
                stock: 1,
                category_id: category.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::InvalidReference { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_price() {
        let db = test_db().await;
        let category = seed_category(&db, "Minuman").await;

        let err = db
            .products()
            .create(&NewProduct {
                name: "Kopi".to_string(),
                description: None,
                price: Money::new(-1),
                stock: 1,
                category_id: category.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Negative { .. }))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_name_case_insensitively() {
        let db = test_db().await;
        let category = seed_category(&db, "Minuman").await;
        let kopi = seed_product(&db, category.id, "Kopi Susu", 18000, 5).await;
        seed_product(&db, category.id, "Teh Manis", 5000, 5).await;
        let kopi_hitam = seed_product(&db, category.id, "KOPI Hitam", 12000, 5).await;

        let all = db.products().list(None).await.unwrap();
        assert_eq!(all.len(), 3);

        let ids: Vec<i64> = db
            .products()
            .list(Some("kopi"))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.product.id)
            .collect();
        assert_eq!(ids, vec![kopi.product.id, kopi_hitam.product.id]);

        assert!(db.products().list(Some("100%")).await.unwrap().is_empty());
        assert_eq!(db.products().list(Some("  ")).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let db = test_db().await;
        let minuman = seed_category(&db, "Minuman").await;
        let makanan = seed_category(&db, "Makanan").await;
        let product = seed_product(&db, minuman.id, "Roti", 8000, 3).await;

        let updated = db
            .products()
            .update(
                product.product.id,
                &ProductPatch {
                    price: Some(Money::new(9000)),
                    category_id: Some(makanan.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.product.name, "Roti");
        assert_eq!(updated.product.price, Money::new(9000));
        assert_eq!(updated.product.stock, 3);
        assert_eq!(updated.category.name, "Makanan");
    }

    #[tokio::test]
    async fn test_update_to_missing_category_is_invalid_reference() {
        let db = test_db().await;
        let category = seed_category(&db, "Minuman").await;
        let product = seed_product(&db, category.id, "Kopi", 1000, 3).await;

        let err = db
            .products()
            .update(
                product.product.id,
                &ProductPatch {
                    category_id: Some(777),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::InvalidReference { id: 777, .. }));

        let unchanged = db.products().get_by_id(product.product.id).await.unwrap();
        assert_eq!(unchanged.product.category_id, category.id);
    }

    #[tokio::test]
    async fn test_update_to_deleted_category_is_invalid_reference() {
        let db = test_db().await;
        let minuman = seed_category(&db, "Minuman").await;
        let retired = seed_category(&db, "Musiman").await;
        db.categories().delete(retired.id).await.unwrap();
        let product = seed_product(&db, minuman.id, "Kopi", 1000, 3).await;

        let err = db
            .products()
            .update(
                product.product.id,
                &ProductPatch {
                    category_id: Some(retired.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::InvalidReference { id, .. } if id == retired.id));

        let unchanged = db.products().get_by_id(product.product.id).await.unwrap();
        assert_eq!(unchanged.product.category_id, minuman.id);
    }

    #[tokio::test]
    async fn test_update_rejects_negative_stock() {
        let db = test_db().await;
        let category = seed_category(&db, "Minuman").await;
        let product = seed_product(&db, category.id, "Kopi", 1000, 3).await;

        let err = db
            .products()
            .update(
                product.product.id,
                &ProductPatch {
                    stock: Some(-5),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(_)));
    }

    #[tokio::test]
    async fn test_delete_hides_product() {
        let db = test_db().await;
        let category = seed_category(&db, "Minuman").await;
        let product = seed_product(&db, category.id, "Kopi", 1000, 3).await;
        let id = product.product.id;

        db.products().delete(id).await.unwrap();

        assert!(matches!(
            db.products().get_by_id(id).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.products().delete(id).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.products()
                .update(id, &ProductPatch::default())
                .await,
            Err(DbError::NotFound { .. })
        ));
        assert!(db.products().list(None).await.unwrap().is_empty());
    }
}
