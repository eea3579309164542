//! Dashboard aggregation.

use std::sync::Arc;

use serde::Serialize;

use libris_auth::rbac::{RbacEnforcer, SystemPermission};
use libris_core::result::AppResult;
use libris_core::traits::Clock;
use libris_database::repositories::{
    AuthorRepository, BookRepository, CategoryRepository, LoanRepository, UserRepository,
};
use libris_entity::book::BookDetails;

use crate::context::RequestContext;
use crate::loan::LoanView;

const RECENT_LIMIT: i64 = 5;

/// Totals every user sees.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryStats {
    /// Books in the catalogue.
    pub total_books: i64,
    /// Books on the shelf.
    pub available_books: i64,
    /// Books out on loan.
    pub borrowed_books: i64,
    /// The acting user's unreturned loans.
    pub user_loans: i64,
    /// The acting user's overdue loans.
    pub overdue_loans: i64,
}

/// Totals only staff see.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStats {
    /// Registered users.
    pub total_users: i64,
    /// Loans ever made.
    pub total_loans: i64,
    /// Unreturned loans.
    pub active_loans: i64,
    /// Overdue loans across all members.
    pub overdue_loans_system: i64,
    /// Authors in the catalogue.
    pub total_authors: i64,
    /// Categories in the catalogue.
    pub total_categories: i64,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// Catalogue and personal totals.
    pub stats: LibraryStats,
    /// Staff-only totals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_stats: Option<SystemStats>,
    /// Most recently added books.
    pub recent_books: Vec<BookDetails>,
    /// The acting user's unreturned loans.
    pub user_active_loans: Vec<LoanView>,
    /// Most recent loans system-wide (staff only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_loans: Option<Vec<LoanView>>,
}

/// Builds the dashboard.
pub struct DashboardService {
    book_repo: Arc<BookRepository>,
    loan_repo: Arc<LoanRepository>,
    user_repo: Arc<UserRepository>,
    author_repo: Arc<AuthorRepository>,
    category_repo: Arc<CategoryRepository>,
    rbac: Arc<RbacEnforcer>,
    clock: Arc<dyn Clock>,
}

impl DashboardService {
    /// Creates a new dashboard service.
    pub fn new(
        book_repo: Arc<BookRepository>,
        loan_repo: Arc<LoanRepository>,
        user_repo: Arc<UserRepository>,
        author_repo: Arc<AuthorRepository>,
        category_repo: Arc<CategoryRepository>,
        rbac: Arc<RbacEnforcer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            book_repo,
            loan_repo,
            user_repo,
            author_repo,
            category_repo,
            rbac,
            clock,
        }
    }

    /// Build the dashboard for the acting user.
    pub async fn build(&self, ctx: &RequestContext) -> AppResult<Dashboard> {
        let now = self.clock.now();

        let (total_books, available_books) = self.book_repo.availability_counts().await?;
        let (user_loans, overdue_loans) =
            self.loan_repo.counts_for_user(ctx.user_id(), now).await?;

        let stats = LibraryStats {
            total_books,
            available_books,
            borrowed_books: total_books - available_books,
            user_loans,
            overdue_loans,
        };

        let recent_books = self.book_repo.recent(RECENT_LIMIT).await?;
        let user_active_loans = self
            .loan_repo
            .active_for_user(ctx.user_id())
            .await?
            .into_iter()
            .map(|details| LoanView::at(details, now))
            .collect();

        let staff = self
            .rbac
            .has_permission(&ctx.role(), &SystemPermission::StatsViewSystem);
        let (system_stats, recent_loans) = if staff {
            let loans = self.loan_repo.counts(now).await?;
            let system = SystemStats {
                total_users: self.user_repo.count().await?,
                total_loans: loans.total,
                active_loans: loans.active,
                overdue_loans_system: loans.overdue,
                total_authors: self.author_repo.count().await?,
                total_categories: self.category_repo.count().await?,
            };
            let recent = self
                .loan_repo
                .recent(RECENT_LIMIT)
                .await?
                .into_iter()
                .map(|details| LoanView::at(details, now))
                .collect();
            (Some(system), Some(recent))
        } else {
            (None, None)
        };

        Ok(Dashboard {
            stats,
            system_stats,
            recent_books,
            user_active_loans,
            recent_loans,
        })
    }
}
