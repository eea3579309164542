//! Author repository implementation.

use sqlx::PgPool;

use libris_core::error::{AppError, ErrorKind};
use libris_core::result::AppResult;
use libris_core::types::{AuthorId, PageRequest, PageResponse};
use libris_entity::author::{Author, AuthorWithCount, CreateAuthor, UpdateAuthor};

const SELECT_WITH_COUNT: &str = "SELECT a.*, \
     (SELECT COUNT(*) FROM books b WHERE b.author_id = a.id) AS books_count \
     FROM authors a";

/// Repository for author CRUD and search.
#[derive(Debug, Clone)]
pub struct AuthorRepository {
    pool: PgPool,
}

impl AuthorRepository {
    /// Create a new author repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an author by primary key.
    pub async fn find_by_id(&self, id: AuthorId) -> AppResult<Option<Author>> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find author", e))
    }

    /// Authors whose name contains `search`, alphabetically, with book counts.
    pub async fn search(
        &self,
        search: Option<&str>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuthorWithCount>> {
        let pattern = search.map(|s| format!("%{}%", s.trim()));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM authors WHERE ($1::TEXT IS NULL OR name ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count authors", e))?;

        let authors = sqlx::query_as::<_, AuthorWithCount>(&format!(
            "{SELECT_WITH_COUNT} WHERE ($1::TEXT IS NULL OR a.name ILIKE $1) \
             ORDER BY a.name ASC LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list authors", e))?;

        Ok(PageResponse::new(authors, page, total))
    }

    /// Create an author.
    pub async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("INSERT INTO authors (name, bio) VALUES ($1, $2) RETURNING *")
            .bind(data.name.trim())
            .bind(&data.bio)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create author", e))
    }

    /// Apply the non-empty fields of `data`.
    pub async fn update(&self, data: &UpdateAuthor) -> AppResult<Option<Author>> {
        sqlx::query_as::<_, Author>(
            "UPDATE authors SET \
             name = COALESCE($2, name), \
             bio = COALESCE($3, bio), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(data.id)
        .bind(data.name.as_deref().map(str::trim))
        .bind(&data.bio)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update author", e))
    }

    /// Delete an author. Returns `false` if no row matched.
    pub async fn delete(&self, id: AuthorId) -> AppResult<bool> {
        sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::unprocessable("Cannot delete author with existing books.")
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to delete author", e),
            })
    }

    /// Number of books written by the author.
    pub async fn count_books(&self, id: AuthorId) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count author books", e)
            })
    }

    /// Count all authors.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count authors", e))
    }
}
