//! Book repository implementation.
//!
//! Catalogue writes never touch `available`; only
//! [`LoanTransaction`](super::loan::LoanTransaction) does.

use sqlx::{PgPool, Postgres, QueryBuilder};

use libris_core::error::{AppError, ErrorKind};
use libris_core::result::AppResult;
use libris_core::types::{BookId, PageRequest, PageResponse};
use libris_entity::book::{Book, BookDetails, BookFilter, CreateBook, UpdateBook};

const SELECT_DETAILS: &str = "SELECT b.*, a.name AS author_name, c.name AS category_name \
     FROM books b \
     JOIN authors a ON a.id = b.author_id \
     JOIN categories c ON c.id = b.category_id";

/// Repository for catalogue reads and writes.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// Create a new book repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a book by primary key.
    pub async fn find_by_id(&self, id: BookId) -> AppResult<Option<Book>> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find book", e))
    }

    /// Find a book with its author and category names.
    pub async fn find_details(&self, id: BookId) -> AppResult<Option<BookDetails>> {
        sqlx::query_as::<_, BookDetails>(&format!("{SELECT_DETAILS} WHERE b.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find book details", e)
            })
    }

    /// Search the catalogue, newest first.
    pub async fn search(
        &self,
        filter: &BookFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<BookDetails>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books b WHERE TRUE");
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count books", e))?;

        let mut select = QueryBuilder::<Postgres>::new(SELECT_DETAILS);
        select.push(" WHERE TRUE");
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY b.created_at DESC, b.title ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let books = select
            .build_query_as::<BookDetails>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search books", e))?;

        Ok(PageResponse::new(books, page, total))
    }

    /// The most recently added books.
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<BookDetails>> {
        sqlx::query_as::<_, BookDetails>(&format!(
            "{SELECT_DETAILS} ORDER BY b.created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list recent books", e))
    }

    /// Insert a book. New books are always available.
    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let isbn = data.isbn.trim();
        sqlx::query_as::<_, Book>(
            "INSERT INTO books \
             (title, isbn, description, publication_date, author_id, category_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.title.trim())
        .bind(isbn)
        .bind(&data.description)
        .bind(data.publication_date)
        .bind(data.author_id)
        .bind(data.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, isbn, "Failed to create book"))
    }

    /// Apply the non-empty fields of `data`.
    pub async fn update(&self, data: &UpdateBook) -> AppResult<Option<Book>> {
        let isbn = data.isbn.as_deref().map(str::trim);
        sqlx::query_as::<_, Book>(
            "UPDATE books SET \
             title = COALESCE($2, title), \
             isbn = COALESCE($3, isbn), \
             description = COALESCE($4, description), \
             publication_date = COALESCE($5, publication_date), \
             author_id = COALESCE($6, author_id), \
             category_id = COALESCE($7, category_id), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(data.id)
        .bind(data.title.as_deref().map(str::trim))
        .bind(isbn)
        .bind(&data.description)
        .bind(data.publication_date)
        .bind(data.author_id)
        .bind(data.category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, isbn.unwrap_or_default(), "Failed to update book"))
    }

    /// Delete a book and, by cascade, its returned loans.
    ///
    /// The active-loan check and the delete share one statement so a
    /// concurrent borrow cannot slip between them.
    pub async fn delete_unless_loaned(&self, id: BookId) -> AppResult<DeleteOutcome> {
        let deleted = sqlx::query(
            "DELETE FROM books WHERE id = $1 \
             AND NOT EXISTS (SELECT 1 FROM loans WHERE book_id = $1 AND returned_at IS NULL)",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete book", e))?
        .rows_affected();

        if deleted > 0 {
            return Ok(DeleteOutcome::Deleted);
        }
        if self.find_by_id(id).await?.is_some() {
            Ok(DeleteOutcome::OnLoan)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }

    /// Whether another book already uses `isbn`.
    pub async fn isbn_taken(&self, isbn: &str, excluding: Option<BookId>) -> AppResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM books WHERE isbn = $1 AND ($2::UUID IS NULL OR id <> $2))",
        )
        .bind(isbn.trim())
        .bind(excluding)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check ISBN", e))
    }

    /// Catalogue totals: all books and the available subset.
    pub async fn availability_counts(&self) -> AppResult<(i64, i64)> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE available) FROM books",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count books", e))
    }
}

/// Result of [`BookRepository::delete_unless_loaned`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The row is gone.
    Deleted,
    /// The book is out on loan and was kept.
    OnLoan,
    /// No such book.
    NotFound,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &BookFilter) {
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        qb.push(" AND (b.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.isbn ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND b.category_id = ").push_bind(category_id);
    }
    if let Some(author_id) = filter.author_id {
        qb.push(" AND b.author_id = ").push_bind(author_id);
    }
    if let Some(available) = filter.available {
        qb.push(" AND b.available = ").push_bind(available);
    }
}

fn map_write_error(e: sqlx::Error, isbn: &str, context: &'static str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("books_isbn_key") => {
            AppError::conflict(format!("ISBN '{isbn}' has already been taken"))
        }
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::unprocessable("Author and category must exist")
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}
