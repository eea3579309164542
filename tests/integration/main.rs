//! HTTP-level integration tests against a PostgreSQL database.
//!
//! Set `LIBRIS_TEST_DATABASE_URL` to run them; without it every test
//! returns early.

mod helpers;

mod catalogue_test;
mod dashboard_test;
mod loan_test;
