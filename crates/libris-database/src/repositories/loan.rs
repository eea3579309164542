//! Loan repository and the transactional unit of work behind borrow and
//! return.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};

use libris_core::error::{AppError, ErrorKind};
use libris_core::result::AppResult;
use libris_core::types::{BookId, LoanId, PageRequest, PageResponse, UserId, ValidationErrors};
use libris_entity::book::Book;
use libris_entity::loan::{Loan, LoanDetails, LoanError, LoanStatus, NewLoan};
use libris_entity::user::User;

const SELECT_DETAILS: &str = "SELECT l.*, \
     b.title AS book_title, b.isbn AS book_isbn, \
     a.name AS author_name, c.name AS category_name, \
     u.email AS user_email, u.name AS user_name \
     FROM loans l \
     JOIN books b ON b.id = l.book_id \
     JOIN authors a ON a.id = b.author_id \
     JOIN categories c ON c.id = b.category_id \
     JOIN users u ON u.id = l.user_id";

/// Criteria for listing loans.
#[derive(Debug, Clone)]
pub struct LoanListQuery {
    /// Restrict to one borrower. `None` lists everyone's loans.
    pub user_id: Option<UserId>,
    /// Restrict to one status.
    pub status: Option<LoanStatus>,
    /// Instant used to decide which loans are overdue.
    pub now: DateTime<Utc>,
}

/// System-wide loan totals.
#[derive(Debug, Clone, Copy, Serialize, FromRow)]
pub struct LoanCounts {
    /// Every loan ever made.
    pub total: i64,
    /// Unreturned loans.
    pub active: i64,
    /// Unreturned loans past their due date.
    pub overdue: i64,
}

/// Repository for loan reads. Writes go through [`LoanTransaction`].
#[derive(Debug, Clone)]
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    /// Create a new loan repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a transaction for one borrow or return.
    pub async fn begin(&self) -> AppResult<LoanTransaction> {
        let tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin loan transaction", e)
        })?;
        Ok(LoanTransaction { tx })
    }

    /// Find a loan with book, author, category and borrower details.
    pub async fn find_details(&self, id: LoanId) -> AppResult<Option<LoanDetails>> {
        sqlx::query_as::<_, LoanDetails>(&format!("{SELECT_DETAILS} WHERE l.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find loan details", e)
            })
    }

    /// The unreturned loan of a book, if it is out.
    pub async fn find_active_for_book(&self, book_id: BookId) -> AppResult<Option<LoanDetails>> {
        sqlx::query_as::<_, LoanDetails>(&format!(
            "{SELECT_DETAILS} WHERE l.book_id = $1 AND l.returned_at IS NULL"
        ))
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find current loan", e)
        })
    }

    /// List loans, newest first.
    pub async fn list(
        &self,
        query: &LoanListQuery,
        page: &PageRequest,
    ) -> AppResult<PageResponse<LoanDetails>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM loans l WHERE TRUE");
        push_filters(&mut count, query);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count loans", e))?;

        let mut select = QueryBuilder::<Postgres>::new(SELECT_DETAILS);
        select.push(" WHERE TRUE");
        push_filters(&mut select, query);
        select
            .push(" ORDER BY l.created_at DESC, l.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let loans = select
            .build_query_as::<LoanDetails>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list loans", e))?;

        Ok(PageResponse::new(loans, page, total))
    }

    /// A borrower's unreturned loans, soonest due first.
    pub async fn active_for_user(&self, user_id: UserId) -> AppResult<Vec<LoanDetails>> {
        sqlx::query_as::<_, LoanDetails>(&format!(
            "{SELECT_DETAILS} WHERE l.user_id = $1 AND l.returned_at IS NULL \
             ORDER BY l.due_date ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list user loans", e))
    }

    /// The most recent loans across all borrowers.
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<LoanDetails>> {
        sqlx::query_as::<_, LoanDetails>(&format!(
            "{SELECT_DETAILS} ORDER BY l.created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list recent loans", e))
    }

    /// Active and overdue loan counts for one borrower.
    pub async fn counts_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<(i64, i64)> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*) FILTER (WHERE returned_at IS NULL), \
             COUNT(*) FILTER (WHERE returned_at IS NULL AND due_date < $2) \
             FROM loans WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count user loans", e))
    }

    /// System-wide loan totals.
    pub async fn counts(&self, now: DateTime<Utc>) -> AppResult<LoanCounts> {
        sqlx::query_as::<_, LoanCounts>(
            "SELECT COUNT(*) AS total, \
             COUNT(*) FILTER (WHERE returned_at IS NULL) AS active, \
             COUNT(*) FILTER (WHERE returned_at IS NULL AND due_date < $1) AS overdue \
             FROM loans",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count loans", e))
    }
}

/// One borrow or return in flight.
///
/// Rows read through the `lock_*` methods stay locked until [`commit`]
/// or drop. Dropping without committing rolls everything back, so the
/// availability flag never changes without the matching loan row.
///
/// [`commit`]: LoanTransaction::commit
pub struct LoanTransaction {
    tx: Transaction<'static, Postgres>,
}

impl LoanTransaction {
    /// Lock a user row. Serialises concurrent borrows by the same user.
    pub async fn lock_user(&mut self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock user", e))
    }

    /// Number of unreturned loans held by a user.
    pub async fn count_active_loans(&mut self, user_id: UserId) -> AppResult<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE user_id = $1 AND returned_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count active loans", e)
        })?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Lock a book row. Serialises concurrent borrows of the same book.
    pub async fn lock_book(&mut self, id: BookId) -> AppResult<Option<Book>> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock book", e))
    }

    /// Lock a loan row.
    pub async fn lock_loan(&mut self, id: LoanId) -> AppResult<Option<Loan>> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock loan", e))
    }

    /// Lock the unreturned loan of a book, if any.
    pub async fn lock_active_loan_for_book(&mut self, book_id: BookId) -> AppResult<Option<Loan>> {
        sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE book_id = $1 AND returned_at IS NULL FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock current loan", e))
    }

    /// Insert a validated loan.
    ///
    /// A second active loan for the same book is refused by the
    /// `loans_one_active_per_book` index and reported as unavailable.
    pub async fn insert_loan(&mut self, loan: &NewLoan) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            "INSERT INTO loans (id, user_id, book_id, borrowed_at, due_date, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $4, $4) RETURNING *",
        )
        .bind(loan.id)
        .bind(loan.user_id)
        .bind(loan.book_id)
        .bind(loan.borrowed_at)
        .bind(loan.due_date)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("loans_one_active_per_book") =>
            {
                LoanError::BookUnavailable {
                    book_id: loan.book_id,
                }
                .into()
            }
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("loans_due_after_borrow") =>
            {
                LoanError::ValidationFailed(ValidationErrors::single(
                    "due_date",
                    "must be after borrowed date",
                ))
                .into()
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create loan", e),
        })
    }

    /// Persist the return of a loan previously locked in this transaction.
    pub async fn save_return(&mut self, loan: &Loan) -> AppResult<()> {
        let updated = sqlx::query(
            "UPDATE loans SET returned_at = $2, updated_at = $3 \
             WHERE id = $1 AND returned_at IS NULL",
        )
        .bind(loan.id)
        .bind(loan.returned_at)
        .bind(loan.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to return loan", e))?
        .rows_affected();

        if updated == 0 {
            return Err(LoanError::LoanNotFound.into());
        }
        Ok(())
    }

    /// Flip a book's availability flag.
    pub async fn set_book_available(
        &mut self,
        book_id: BookId,
        available: bool,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE books SET available = $2, updated_at = $3 WHERE id = $1")
            .bind(book_id)
            .bind(available)
            .bind(now)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update book availability", e)
            })?;
        Ok(())
    }

    /// Commit every change made in this transaction.
    pub async fn commit(self) -> AppResult<()> {
        self.tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit loan transaction", e)
        })
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &LoanListQuery) {
    if let Some(user_id) = query.user_id {
        qb.push(" AND l.user_id = ").push_bind(user_id);
    }
    match query.status {
        Some(LoanStatus::Active) => {
            qb.push(" AND l.returned_at IS NULL");
        }
        Some(LoanStatus::Returned) => {
            qb.push(" AND l.returned_at IS NOT NULL");
        }
        Some(LoanStatus::Overdue) => {
            qb.push(" AND l.returned_at IS NULL AND l.due_date < ")
                .push_bind(query.now);
        }
        None => {}
    }
}
