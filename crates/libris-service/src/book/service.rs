//! Book CRUD, search and ISBN checks.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use libris_auth::rbac::{RbacEnforcer, SystemPermission};
use libris_core::error::AppError;
use libris_core::result::AppResult;
use libris_core::traits::Clock;
use libris_core::types::{BookId, PageRequest, PageResponse};
use libris_database::repositories::book::{BookRepository, DeleteOutcome};
use libris_database::repositories::loan::LoanRepository;
use libris_entity::book::{Book, BookDetails, BookFilter, CreateBook, UpdateBook};

use crate::context::RequestContext;
use crate::loan::LoanView;

/// A book with its current loan, if it is out.
#[derive(Debug, Clone, Serialize)]
pub struct BookView {
    /// The book and its author and category names.
    #[serde(flatten)]
    pub book: BookDetails,
    /// The unreturned loan holding the book.
    pub current_loan: Option<LoanView>,
}

/// Manages the book catalogue.
pub struct BookService {
    book_repo: Arc<BookRepository>,
    loan_repo: Arc<LoanRepository>,
    rbac: Arc<RbacEnforcer>,
    clock: Arc<dyn Clock>,
}

impl BookService {
    /// Creates a new book service.
    pub fn new(
        book_repo: Arc<BookRepository>,
        loan_repo: Arc<LoanRepository>,
        rbac: Arc<RbacEnforcer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            book_repo,
            loan_repo,
            rbac,
            clock,
        }
    }

    /// Search the catalogue.
    pub async fn list(
        &self,
        filter: &BookFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<BookDetails>> {
        self.book_repo.search(filter, &page).await
    }

    /// Fetch a book with its current loan.
    pub async fn get(&self, id: BookId) -> AppResult<BookView> {
        let book = self
            .book_repo
            .find_details(id)
            .await?
            .ok_or_else(|| AppError::not_found("Book not found"))?;
        let now = self.clock.now();
        let current_loan = self
            .loan_repo
            .find_active_for_book(id)
            .await?
            .map(|details| LoanView::at(details, now));

        Ok(BookView { book, current_loan })
    }

    /// Add a book to the catalogue. It starts out available.
    pub async fn create(&self, ctx: &RequestContext, data: CreateBook) -> AppResult<Book> {
        self.rbac
            .require_permission(&ctx.role(), &SystemPermission::BookManage)?;
        data.validate()?;

        let book = self.book_repo.create(&data).await?;
        info!(user_id = %ctx.user_id(), book_id = %book.id, isbn = %book.isbn, "Book created");
        Ok(book)
    }

    /// Edit catalogue fields. Availability is not editable here.
    pub async fn update(&self, ctx: &RequestContext, data: UpdateBook) -> AppResult<Book> {
        self.rbac
            .require_permission(&ctx.role(), &SystemPermission::BookManage)?;
        data.validate()?;

        let book = self
            .book_repo
            .update(&data)
            .await?
            .ok_or_else(|| AppError::not_found("Book not found"))?;
        info!(user_id = %ctx.user_id(), book_id = %book.id, "Book updated");
        Ok(book)
    }

    /// Remove a book. Refused while the book is out on loan.
    pub async fn delete(&self, ctx: &RequestContext, id: BookId) -> AppResult<()> {
        self.rbac
            .require_permission(&ctx.role(), &SystemPermission::BookManage)?;

        match self.book_repo.delete_unless_loaned(id).await? {
            DeleteOutcome::Deleted => {
                info!(user_id = %ctx.user_id(), book_id = %id, "Book deleted");
                Ok(())
            }
            DeleteOutcome::OnLoan => Err(AppError::unprocessable(
                "Cannot delete book with active loans",
            )),
            DeleteOutcome::NotFound => Err(AppError::not_found("Book not found")),
        }
    }

    /// Whether `isbn` is free, ignoring the book being edited.
    pub async fn isbn_available(&self, isbn: &str, excluding: Option<BookId>) -> AppResult<bool> {
        if isbn.trim().is_empty() {
            return Err(AppError::validation("ISBN is required"));
        }
        Ok(!self.book_repo.isbn_taken(isbn, excluding).await?)
    }
}
