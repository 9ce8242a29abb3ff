//! # Category Repository
//!
//! Database operations for product categories.
//!
//! ## Delete Policy
//! ```text
//! DELETE /categories/3
//!      │
//!      ▼
//! UPDATE categories SET deleted_at = now
//! WHERE id = 3 AND deleted_at IS NULL
//!   AND NOT EXISTS (live product with category_id = 3)
//!      │
//!      ├── 1 row  → deleted
//!      └── 0 rows → category missing?  → NotFound
//!                   otherwise          → CategoryInUse { product_count }
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasir_core::validation::{validate_category, validate_new_category};
use kasir_core::{Category, CategoryPatch, NewCategory, RecordStatus};

/// Raw `categories` row.
#[derive(Debug, FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
            status: RecordStatus::from_deleted_at(row.deleted_at),
        }
    }
}

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists live categories ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, created_at, updated_at, deleted_at
            FROM categories
            WHERE deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed categories");
        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Gets a live category by id.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - absent or soft-deleted
    pub async fn get_by_id(&self, id: i64) -> DbResult<Category> {
        let row: Option<CategoryRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, created_at, updated_at, deleted_at
            FROM categories
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Category::from)
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Inserts a new category.
    pub async fn create(&self, input: &NewCategory) -> DbResult<Category> {
        validate_new_category(input)?;

        debug!(name = %input.name, "Inserting category");

        let now = Utc::now();
        let name = input.name.trim().to_string();
        let description = input.description.clone().unwrap_or_default();

        let result = sqlx::query(
            r#"
            INSERT INTO categories (name, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            "#,
        )
        .bind(&name)
        .bind(&description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name,
            description,
            created_at: now,
            updated_at: now,
            status: RecordStatus::Active,
        })
    }

    /// Merges `patch` onto a live category.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - absent or soft-deleted
    /// * `Err(DbError::Domain(..))` - merged category fails validation
    pub async fn update(&self, id: i64, patch: &CategoryPatch) -> DbResult<Category> {
        debug!(id = %id, "Updating category");

        let current = self.get_by_id(id).await?;
        let mut merged = current.apply(patch);
        merged.name = merged.name.trim().to_string();
        validate_category(&merged)?;

        // Absent fields keep the row's value at write time.
        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                updated_at = ?4
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.description.as_deref())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.get_by_id(id).await
    }

    /// Soft-deletes a category that no live product references.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - absent or already deleted
    /// * `Err(DbError::CategoryInUse)` - live products still point at it
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting category");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET deleted_at = ?2, updated_at = ?2
            WHERE id = ?1
              AND deleted_at IS NULL
              AND NOT EXISTS (
                  SELECT 1 FROM products
                  WHERE category_id = ?1 AND deleted_at IS NULL
              )
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let (live, product_count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM categories WHERE id = ?1 AND deleted_at IS NULL),
                (SELECT COUNT(*) FROM products WHERE category_id = ?1 AND deleted_at IS NULL)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if live == 0 {
            Err(DbError::not_found("Category", id))
        } else {
            Err(DbError::CategoryInUse {
                category_id: id,
                product_count,
            })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
