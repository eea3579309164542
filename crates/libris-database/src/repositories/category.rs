//! Category repository implementation.

use sqlx::PgPool;

use libris_core::error::{AppError, ErrorKind};
use libris_core::result::AppResult;
use libris_core::types::{CategoryId, PageRequest, PageResponse};
use libris_entity::category::{Category, CategoryWithCount, CreateCategory, UpdateCategory};

/// Repository for category CRUD and search.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new category repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a category by primary key.
    pub async fn find_by_id(&self, id: CategoryId) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find category", e))
    }

    /// Categories whose name contains `search`, alphabetically, with the
    /// number of books filed under each.
    pub async fn search(
        &self,
        search: Option<&str>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<CategoryWithCount>> {
        let pattern = search.map(|s| format!("%{}%", s.trim()));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM categories WHERE ($1::TEXT IS NULL OR name ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count categories", e))?;

        let categories = sqlx::query_as::<_, CategoryWithCount>(
            "SELECT c.*, COUNT(b.id) AS books_count \
             FROM categories c LEFT JOIN books b ON b.category_id = c.id \
             WHERE ($1::TEXT IS NULL OR c.name ILIKE $1) \
             GROUP BY c.id \
             ORDER BY c.name ASC LIMIT $2 OFFSET $3",
        )
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list categories", e))?;

        Ok(PageResponse::new(categories, page, total))
    }

    /// Create a category. Names are unique.
    pub async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        let name = data.name.trim();
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, name, "Failed to create category"))
    }

    /// Apply the non-empty fields of `data`.
    pub async fn update(&self, data: &UpdateCategory) -> AppResult<Option<Category>> {
        let name = data.name.as_deref().map(str::trim);
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET \
             name = COALESCE($2, name), \
             description = COALESCE($3, description), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(data.id)
        .bind(name)
        .bind(&data.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, name.unwrap_or_default(), "Failed to update category"))
    }

    /// Delete a category. Returns `false` if no row matched.
    pub async fn delete(&self, id: CategoryId) -> AppResult<bool> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::unprocessable("Cannot delete category with existing books.")
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to delete category", e),
            })
    }

    /// Number of books filed under the category.
    pub async fn count_books(&self, id: CategoryId) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE category_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count category books", e)
            })
    }

    /// Count all categories.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count categories", e)
            })
    }
}

fn map_write_error(e: sqlx::Error, name: &str, context: &'static str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("categories_name_key") => {
            AppError::conflict(format!("Category '{name}' already exists"))
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}
