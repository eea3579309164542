//! Loan entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use libris_core::types::{BookId, LoanId, UserId, ValidationErrors};

use crate::book::Book;

use super::error::LoanError;
use super::policy;
use super::status::LoanStatus;

/// One borrowing event of one book by one user.
///
/// A loan is mutated exactly once, when it is returned. It is never
/// edited otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Loan {
    /// Unique loan identifier.
    pub id: LoanId,
    /// The borrower.
    pub user_id: UserId,
    /// The borrowed book.
    pub book_id: BookId,
    /// When the book was taken out.
    pub borrowed_at: DateTime<Utc>,
    /// When the book is due back. Always after `borrowed_at`.
    pub due_date: DateTime<Utc>,
    /// When the book came back; `None` while the loan is active.
    pub returned_at: Option<DateTime<Utc>>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// Whether the loan has been closed.
    pub fn is_returned(&self) -> bool {
        self.returned_at.is_some()
    }

    /// Whether the book is still out.
    pub fn is_active(&self) -> bool {
        self.returned_at.is_none()
    }

    /// Whether the loan is unreturned and past due at `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        policy::is_overdue(self.returned_at, self.due_date, now)
    }

    /// Status at `now`. A returned loan stays returned whatever its due date.
    pub fn status(&self, now: DateTime<Utc>) -> LoanStatus {
        if self.is_returned() {
            LoanStatus::Returned
        } else if self.is_overdue(now) {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        }
    }

    /// Whole calendar days past the due date, or 0 when not overdue.
    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        if !self.is_overdue(now) {
            return 0;
        }
        (now.date_naive() - self.due_date.date_naive()).num_days().max(0)
    }

    /// Close the loan at `now` and return how many days late it came back.
    ///
    /// A second return is rejected and leaves `returned_at` untouched.
    pub fn mark_returned(&mut self, now: DateTime<Utc>) -> Result<i64, LoanError> {
        if let Some(returned_at) = self.returned_at {
            return Err(LoanError::AlreadyReturned {
                loan_id: self.id,
                returned_at,
            });
        }
        if now < self.borrowed_at {
            return Err(LoanError::ValidationFailed(ValidationErrors::single(
                "returned_at",
                "can't be before borrowed date",
            )));
        }

        let overdue_days = self.days_overdue(now);
        self.returned_at = Some(now);
        self.updated_at = now;
        Ok(overdue_days)
    }
}

/// A validated loan that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    /// Identifier assigned up front.
    pub id: LoanId,
    /// The borrower.
    pub user_id: UserId,
    /// The book.
    pub book_id: BookId,
    /// Borrow instant.
    pub borrowed_at: DateTime<Utc>,
    /// Due date.
    pub due_date: DateTime<Utc>,
}

impl NewLoan {
    /// Validate and build a loan of `book` for `user_id`.
    ///
    /// Fails if the due date is not after `borrowed_at` or the book is
    /// out on loan.
    pub fn open(
        user_id: UserId,
        book: &Book,
        borrowed_at: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> Result<Self, LoanError> {
        policy::validate_due_date(borrowed_at, due_date)?;
        if !book.available {
            return Err(LoanError::BookUnavailable { book_id: book.id });
        }

        Ok(Self {
            id: LoanId::new(),
            user_id,
            book_id: book.id,
            borrowed_at,
            due_date,
        })
    }
}

/// A loan joined with the book, author, category and borrower it refers to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoanDetails {
    /// The loan row.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub loan: Loan,
    /// Title of the book.
    pub book_title: String,
    /// ISBN of the book.
    pub book_isbn: String,
    /// Author name.
    pub author_name: String,
    /// Category name.
    pub category_name: String,
    /// Borrower email.
    pub user_email: String,
    /// Borrower display name.
    pub user_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use libris_core::types::{AuthorId, CategoryId};

    use crate::loan::BorrowingPolicy;

    fn day0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 9, 30, 0)
            .single()
            .expect("valid instant")
    }

    fn book(available: bool) -> Book {
        Book {
            id: BookId::new(),
            title: "The Left Hand of Darkness".into(),
            isbn: "9780441478125".into(),
            description: None,
            publication_date: None,
            available,
            author_id: AuthorId::new(),
            category_id: CategoryId::new(),
            created_at: day0(),
            updated_at: day0(),
        }
    }

    fn loan_from(new: NewLoan) -> Loan {
        Loan {
            id: new.id,
            user_id: new.user_id,
            book_id: new.book_id,
            borrowed_at: new.borrowed_at,
            due_date: new.due_date,
            returned_at: None,
            created_at: new.borrowed_at,
            updated_at: new.borrowed_at,
        }
    }

    #[test]
    fn test_open_rejects_due_date_not_after_borrow() {
        let err = NewLoan::open(UserId::new(), &book(true), day0(), day0()).unwrap_err();
        match err {
            LoanError::ValidationFailed(errors) => {
                assert!(errors.get("due_date").is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_open_rejects_unavailable_book() {
        let b = book(false);
        let err =
            NewLoan::open(UserId::new(), &b, day0(), day0() + Duration::days(1)).unwrap_err();
        assert_eq!(err, LoanError::BookUnavailable { book_id: b.id });
    }

    #[test]
    fn test_second_return_is_rejected_and_keeps_timestamp() {
        let policy = BorrowingPolicy::default();
        let b = book(true);
        let due = policy.due_date(day0(), None).expect("in range");
        let mut loan =
            loan_from(NewLoan::open(UserId::new(), &b, day0(), due).expect("valid loan"));

        let first = day0() + Duration::days(2);
        assert_eq!(loan.mark_returned(first).expect("first return"), 0);
        assert_eq!(loan.returned_at, Some(first));

        let err = loan.mark_returned(first + Duration::days(1)).unwrap_err();
        assert!(matches!(err, LoanError::AlreadyReturned { .. }));
        assert_eq!(loan.returned_at, Some(first));
    }

    #[test]
    fn test_return_before_borrow_is_rejected() {
        let b = book(true);
        let mut loan = loan_from(
            NewLoan::open(UserId::new(), &b, day0(), day0() + Duration::days(14))
                .expect("valid loan"),
        );
        assert!(loan.mark_returned(day0() - Duration::hours(1)).is_err());
        assert!(loan.is_active());
    }

    #[test]
    fn test_day_zero_fourteen_twenty_scenario() {
        let policy = BorrowingPolicy::default();
        let b = book(true);
        let due = policy.due_date(day0(), None).expect("in range");
        let mut loan =
            loan_from(NewLoan::open(UserId::new(), &b, day0(), due).expect("valid loan"));

        assert_eq!(loan.due_date, day0() + Duration::days(14));
        assert_eq!(loan.status(day0()), LoanStatus::Active);

        // Exactly at the due instant the loan is not yet overdue.
        assert_eq!(loan.status(day0() + Duration::days(14)), LoanStatus::Active);

        let day20 = day0() + Duration::days(20);
        assert_eq!(loan.status(day20), LoanStatus::Overdue);
        assert!(loan.is_overdue(day20));
        assert_eq!(loan.days_overdue(day20), 6);

        assert_eq!(loan.mark_returned(day20).expect("return"), 6);
        assert_eq!(loan.status(day20), LoanStatus::Returned);
        assert!(!loan.is_overdue(day20 + Duration::days(100)));
        assert_eq!(loan.days_overdue(day20), 0);
    }

    #[test]
    fn test_days_overdue_counts_calendar_days() {
        let b = book(true);
        let loan = loan_from(
            NewLoan::open(UserId::new(), &b, day0(), day0() + Duration::days(1))
                .expect("valid loan"),
        );
        let just_after = day0() + Duration::days(1) + Duration::hours(1);
        assert!(loan.is_overdue(just_after));
        assert_eq!(loan.days_overdue(just_after), 0);
        assert_eq!(loan.days_overdue(day0() + Duration::days(3)), 2);
    }

    #[test]
    fn test_late_return_reports_days_overdue_at_return_time() {
        let b = book(true);
        let mut loan = loan_from(
            NewLoan::open(UserId::new(), &b, day0(), day0() + Duration::days(14))
                .expect("valid loan"),
        );
        let day23 = day0() + Duration::days(23);

        assert_eq!(loan.mark_returned(day23).expect("return"), 9);
        // Once closed the loan no longer reads as overdue.
        assert_eq!(loan.days_overdue(day23), 0);
    }
}
