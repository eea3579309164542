//! Integration tests for books, authors and categories.

use http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::{TestApp, unique_isbn};

#[tokio::test]
async fn test_borrower_cannot_manage_catalogue() {
    let Some(app) = TestApp::new().await else { return };
    let borrower = app.create_user("borrower").await;
    let author = app.create_author().await;
    let category = app.create_category().await;

    let response = app
        .request(
            "POST",
            "/api/books",
            Some(json!({
                "title": "Persuasion",
                "isbn": unique_isbn(),
                "author_id": author,
                "category_id": category,
            })),
            Some(borrower),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("POST", "/api/authors", Some(json!({ "name": "Anon" })), Some(borrower))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_librarian_creates_available_book() {
    let Some(app) = TestApp::new().await else { return };
    let librarian = app.create_user("librarian").await;
    let author = app.create_author().await;
    let category = app.create_category().await;

    let response = app
        .request(
            "POST",
            "/api/books",
            Some(json!({
                "title": "Persuasion",
                "isbn": unique_isbn(),
                "publication_date": "1817-12-20",
                "author_id": author,
                "category_id": category,
            })),
            Some(librarian),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.data()["title"], "Persuasion");
    assert_eq!(response.data()["available"], true);
}

#[tokio::test]
async fn test_availability_cannot_be_written_directly() {
    let Some(app) = TestApp::new().await else { return };
    let librarian = app.create_user("librarian").await;
    let author = app.create_author().await;
    let category = app.create_category().await;
    let book = app.create_book(author, category).await;

    let create = app
        .request(
            "POST",
            "/api/books",
            Some(json!({
                "title": "Emma",
                "isbn": unique_isbn(),
                "author_id": author,
                "category_id": category,
                "available": false,
            })),
            Some(librarian),
        )
        .await;
    assert_eq!(create.status, StatusCode::BAD_REQUEST);

    let update = app
        .request(
            "PUT",
            &format!("/api/books/{book}"),
            Some(json!({ "available": false })),
            Some(librarian),
        )
        .await;
    assert_eq!(update.status, StatusCode::BAD_REQUEST);
    assert!(app.book_available(book).await);
}

#[tokio::test]
async fn test_blank_title_is_unprocessable() {
    let Some(app) = TestApp::new().await else { return };
    let librarian = app.create_user("librarian").await;
    let author = app.create_author().await;
    let category = app.create_category().await;

    let response = app
        .request(
            "POST",
            "/api/books",
            Some(json!({
                "title": "",
                "isbn": unique_isbn(),
                "author_id": author,
                "category_id": category,
            })),
            Some(librarian),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["details"]["title"].is_array());
}

#[tokio::test]
async fn test_duplicate_isbn_conflicts() {
    let Some(app) = TestApp::new().await else { return };
    let librarian = app.create_user("librarian").await;
    let author = app.create_author().await;
    let category = app.create_category().await;
    let isbn = unique_isbn();

    let body = json!({
        "title": "Emma",
        "isbn": isbn,
        "author_id": author,
        "category_id": category,
    });
    let first = app
        .request("POST", "/api/books", Some(body.clone()), Some(librarian))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app
        .request("POST", "/api/books", Some(body), Some(librarian))
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);

    let check = app
        .request(
            "GET",
            &format!("/api/books/validate_isbn?isbn={isbn}"),
            None,
            Some(librarian),
        )
        .await;
    assert_eq!(check.data()["available"], false);

    let own = first.data()["id"].as_str().unwrap_or_default();
    let excluding = app
        .request(
            "GET",
            &format!("/api/books/validate_isbn?isbn={isbn}&exclude_id={own}"),
            None,
            Some(librarian),
        )
        .await;
    assert_eq!(excluding.data()["available"], true);
}

#[tokio::test]
async fn test_book_with_unknown_author_is_unprocessable() {
    let Some(app) = TestApp::new().await else { return };
    let librarian = app.create_user("librarian").await;
    let category = app.create_category().await;

    let response = app
        .request(
            "POST",
            "/api/books",
            Some(json!({
                "title": "Orphan",
                "isbn": unique_isbn(),
                "author_id": Uuid::new_v4(),
                "category_id": category,
            })),
            Some(librarian),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_book_on_loan_cannot_be_deleted() {
    let Some(app) = TestApp::new().await else { return };
    let librarian = app.create_user("librarian").await;
    let borrower = app.create_user("borrower").await;
    let book = app.create_standalone_book().await;
    let loan = app.borrow(borrower, book).await;

    let refused = app
        .request("DELETE", &format!("/api/books/{book}"), None, Some(librarian))
        .await;
    assert_eq!(refused.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(refused.body["message"], "Cannot delete book with active loans");

    app.request("PATCH", &format!("/api/loans/{loan}/return"), None, Some(borrower))
        .await;

    let deleted = app
        .request("DELETE", &format!("/api/books/{book}"), None, Some(librarian))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = app
        .request("GET", &format!("/api/books/{book}"), None, Some(librarian))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_author_and_category_with_books_cannot_be_deleted() {
    let Some(app) = TestApp::new().await else { return };
    let librarian = app.create_user("librarian").await;
    let author = app.create_author().await;
    let category = app.create_category().await;
    app.create_book(author, category).await;

    let author_delete = app
        .request("DELETE", &format!("/api/authors/{author}"), None, Some(librarian))
        .await;
    assert_eq!(author_delete.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        author_delete.body["message"],
        "Cannot delete author with existing books."
    );

    let category_delete = app
        .request(
            "DELETE",
            &format!("/api/categories/{category}"),
            None,
            Some(librarian),
        )
        .await;
    assert_eq!(category_delete.status, StatusCode::UNPROCESSABLE_ENTITY);

    let author_view = app
        .request("GET", &format!("/api/authors/{author}"), None, Some(librarian))
        .await;
    assert_eq!(author_view.status, StatusCode::OK);
}

#[tokio::test]
async fn test_empty_author_can_be_deleted() {
    let Some(app) = TestApp::new().await else { return };
    let librarian = app.create_user("librarian").await;
    let author = app.create_author().await;

    let response = app
        .request("DELETE", &format!("/api/authors/{author}"), None, Some(librarian))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["message"], "Author was successfully deleted.");
}

#[tokio::test]
async fn test_duplicate_category_name_conflicts() {
    let Some(app) = TestApp::new().await else { return };
    let librarian = app.create_user("librarian").await;
    let name = format!("Gothic {}", Uuid::new_v4());

    let first = app
        .request("POST", "/api/categories", Some(json!({ "name": name })), Some(librarian))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app
        .request("POST", "/api/categories", Some(json!({ "name": name })), Some(librarian))
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_book_search_filters() {
    let Some(app) = TestApp::new().await else { return };
    let borrower = app.create_user("borrower").await;
    let author = app.create_author().await;
    let category = app.create_category().await;
    let on_shelf = app.create_book(author, category).await;
    let lent = app.create_book(author, category).await;
    app.borrow(borrower, lent).await;

    let by_author = app
        .request("GET", &format!("/api/books?author_id={author}"), None, Some(borrower))
        .await;
    assert_eq!(by_author.status, StatusCode::OK);
    assert_eq!(by_author.data()["total_items"], 2);

    let available = app
        .request(
            "GET",
            &format!("/api/books?author_id={author}&available=true"),
            None,
            Some(borrower),
        )
        .await;
    let items = available.data()["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], on_shelf.to_string());

    let invalid = app
        .request("GET", "/api/books?available=maybe", None, Some(borrower))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_book_detail_shows_current_loan() {
    let Some(app) = TestApp::new().await else { return };
    let borrower = app.create_user("borrower").await;
    let book = app.create_standalone_book().await;

    let before = app
        .request("GET", &format!("/api/books/{book}"), None, Some(borrower))
        .await;
    assert_eq!(before.status, StatusCode::OK);
    assert!(before.data()["current_loan"].is_null());

    let loan = app.borrow(borrower, book).await;
    let after = app
        .request("GET", &format!("/api/books/{book}"), None, Some(borrower))
        .await;
    assert_eq!(after.data()["available"], false);
    assert_eq!(after.data()["current_loan"]["id"], loan.to_string());
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let Some(app) = TestApp::new().await else { return };
    let borrower = app.create_user("borrower").await;

    let response = app
        .request("GET", "/api/books/not-a-uuid", None, Some(borrower))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}
