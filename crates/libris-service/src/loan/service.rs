//! Borrow and return transitions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use libris_auth::rbac::{RbacEnforcer, SystemPermission};
use libris_core::error::AppError;
use libris_core::result::AppResult;
use libris_core::traits::Clock;
use libris_core::types::{BookId, LoanId, PageRequest, PageResponse};
use libris_database::repositories::loan::{LoanListQuery, LoanRepository, LoanTransaction};
use libris_entity::loan::{BorrowingPolicy, Loan, LoanError, LoanStatus, NewLoan};
use libris_entity::user::Borrower;

use super::view::LoanView;
use crate::context::RequestContext;

/// Runs the loan state machine.
///
/// Every transition is one database transaction: the loan row and the
/// book's `available` flag change together or not at all.
pub struct LoanService {
    loan_repo: Arc<LoanRepository>,
    rbac: Arc<RbacEnforcer>,
    policy: BorrowingPolicy,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for LoanService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoanService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl LoanService {
    /// Creates a new loan service.
    pub fn new(
        loan_repo: Arc<LoanRepository>,
        rbac: Arc<RbacEnforcer>,
        policy: BorrowingPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            loan_repo,
            rbac,
            policy,
            clock,
        }
    }

    /// Borrow `book_id` for the acting user.
    ///
    /// The borrow limit is checked before availability. On success the
    /// new loan is stored and the book is marked unavailable.
    pub async fn borrow(
        &self,
        ctx: &RequestContext,
        book_id: BookId,
        requested_due_date: Option<DateTime<Utc>>,
    ) -> AppResult<Loan> {
        self.rbac
            .require_permission(&ctx.role(), &SystemPermission::LoanBorrow)?;

        let now = self.clock.now();
        let mut tx = self.loan_repo.begin().await?;

        let user = tx
            .lock_user(ctx.user_id())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let active = tx.count_active_loans(user.id).await?;
        let borrower = Borrower::new(user, active);

        let book = tx
            .lock_book(book_id)
            .await?
            .ok_or_else(|| AppError::not_found("Book not found"))?;

        if let Err(refusal) = self.policy.check_borrow(borrower.active_loan_count(), &book) {
            info!(
                user_id = %borrower.user.id,
                book_id = %book_id,
                active_loans = borrower.active_loan_count(),
                reason = %refusal,
                "Borrow refused"
            );
            return Err(refusal.into());
        }

        let due_date = self.policy.due_date(now, requested_due_date)?;
        let new_loan = NewLoan::open(borrower.user.id, &book, now, due_date)?;
        let loan = tx.insert_loan(&new_loan).await?;
        tx.set_book_available(book.id, false, now).await?;
        tx.commit().await?;

        info!(
            user_id = %loan.user_id,
            book_id = %loan.book_id,
            loan_id = %loan.id,
            due_date = %loan.due_date,
            "Book borrowed"
        );

        Ok(loan)
    }

    /// Return a loan by id.
    ///
    /// Borrowers may only return their own loans; staff may return any.
    pub async fn return_loan(&self, ctx: &RequestContext, loan_id: LoanId) -> AppResult<Loan> {
        let mut tx = self.loan_repo.begin().await?;
        let loan = tx
            .lock_loan(loan_id)
            .await?
            .ok_or(LoanError::LoanNotFound)?;

        self.close(ctx, tx, loan).await
    }

    /// Return whichever loan currently holds `book_id`.
    pub async fn return_current_loan(
        &self,
        ctx: &RequestContext,
        book_id: BookId,
    ) -> AppResult<Loan> {
        let mut tx = self.loan_repo.begin().await?;
        let loan = tx
            .lock_active_loan_for_book(book_id)
            .await?
            .ok_or(LoanError::NoActiveLoan { book_id })?;

        self.close(ctx, tx, loan).await
    }

    async fn close(
        &self,
        ctx: &RequestContext,
        mut tx: LoanTransaction,
        mut loan: Loan,
    ) -> AppResult<Loan> {
        self.rbac
            .require_owner_or(&ctx.user, loan.user_id, &SystemPermission::LoanReturnAny)?;

        let now = self.clock.now();
        let overdue_days = match loan.mark_returned(now) {
            Ok(days) => days,
            Err(e) => {
                warn!(loan_id = %loan.id, error = %e, "Return refused");
                return Err(e.into());
            }
        };

        tx.save_return(&loan).await?;
        tx.set_book_available(loan.book_id, true, now).await?;
        tx.commit().await?;

        info!(
            user_id = %ctx.user_id(),
            book_id = %loan.book_id,
            loan_id = %loan.id,
            overdue_days,
            "Book returned"
        );

        Ok(loan)
    }

    /// List loans, newest first.
    ///
    /// Borrowers always see only their own loans. Staff see their own
    /// unless `all` is set.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        status: Option<LoanStatus>,
        all: bool,
        page: PageRequest,
    ) -> AppResult<PageResponse<LoanView>> {
        let everyone = all
            && self
                .rbac
                .has_permission(&ctx.role(), &SystemPermission::LoanViewAll);
        let now = self.clock.now();
        let query = LoanListQuery {
            user_id: if everyone { None } else { Some(ctx.user_id()) },
            status,
            now,
        };

        let loans = self.loan_repo.list(&query, &page).await?;
        Ok(loans.map(|details| LoanView::at(details, now)))
    }

    /// Fetch one loan visible to the acting user.
    pub async fn get(&self, ctx: &RequestContext, loan_id: LoanId) -> AppResult<LoanView> {
        let details = self
            .loan_repo
            .find_details(loan_id)
            .await?
            .ok_or(LoanError::LoanNotFound)?;

        // Hide other members' loans instead of revealing they exist.
        if details.loan.user_id != ctx.user_id()
            && !self
                .rbac
                .has_permission(&ctx.role(), &SystemPermission::LoanViewAll)
        {
            return Err(LoanError::LoanNotFound.into());
        }

        Ok(LoanView::at(details, self.clock.now()))
    }

    /// Re-read a loan with its joined names, resolved at the current instant.
    pub async fn view(&self, loan_id: LoanId) -> AppResult<LoanView> {
        let details = self
            .loan_repo
            .find_details(loan_id)
            .await?
            .ok_or(LoanError::LoanNotFound)?;
        Ok(LoanView::at(details, self.clock.now()))
    }

    /// The acting user's unreturned loans.
    pub async fn active_for(&self, ctx: &RequestContext) -> AppResult<Vec<LoanView>> {
        let now = self.clock.now();
        let loans = self.loan_repo.active_for_user(ctx.user_id()).await?;
        Ok(loans
            .into_iter()
            .map(|details| LoanView::at(details, now))
            .collect())
    }
}
