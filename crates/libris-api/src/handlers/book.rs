//! Book catalogue handlers, including borrow and return by book.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use libris_core::error::AppError;
use libris_core::types::{BookId, PageResponse};
use libris_entity::book::{Book, BookDetails, BookFilter};
use libris_service::book::BookView;
use libris_service::loan::LoanView;

use super::page_from;
use crate::dto::request::{BookQuery, BorrowBookRequest, CreateBookRequest, UpdateBookRequest, ValidateIsbnQuery};
use crate::dto::response::{ApiResponse, IsbnCheckResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson, parse_id};
use crate::state::AppState;

/// GET /api/books
pub async fn list_books(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<BookQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<BookDetails>>>> {
    let filter = BookFilter {
        search: query.search.filter(|s| !s.trim().is_empty()),
        category_id: query.category_id.as_deref().map(parse_id).transpose()?,
        author_id: query.author_id.as_deref().map(parse_id).transpose()?,
        available: query.available.as_deref().map(parse_flag).transpose()?,
    };

    let books = state
        .book_service
        .list(&filter, page_from(query.page, query.per_page))
        .await?;
    Ok(Json(ApiResponse::ok(books)))
}

/// GET /api/books/validate_isbn
pub async fn validate_isbn(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ValidateIsbnQuery>,
) -> ApiResult<Json<ApiResponse<IsbnCheckResponse>>> {
    let excluding: Option<BookId> = query.exclude_id.as_deref().map(parse_id).transpose()?;
    let available = state
        .book_service
        .isbn_available(&query.isbn, excluding)
        .await?;

    Ok(Json(ApiResponse::ok(IsbnCheckResponse {
        isbn: query.isbn,
        available,
    })))
}

/// GET /api/books/{id}
pub async fn get_book(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<BookView>>> {
    let book = state.book_service.get(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(book)))
}

/// POST /api/books
pub async fn create_book(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateBookRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Book>>)> {
    let book = state.book_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(book))))
}

/// PUT /api/books/{id}
pub async fn update_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateBookRequest>,
) -> ApiResult<Json<ApiResponse<Book>>> {
    let book = state
        .book_service
        .update(&auth, req.into_update(parse_id(&id)?))
        .await?;
    Ok(Json(ApiResponse::ok(book)))
}

/// DELETE /api/books/{id}
pub async fn delete_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.book_service.delete(&auth, parse_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Book was successfully deleted.",
    ))))
}

/// POST /api/books/{id}/borrow
pub async fn borrow_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: Option<Json<BorrowBookRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<LoanView>>)> {
    let book_id: BookId = parse_id(&id)?;
    let due_date = body.and_then(|Json(req)| req.due_date);

    let loan = state.loan_service.borrow(&auth, book_id, due_date).await?;
    let view = state.loan_service.view(loan.id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(view))))
}

/// PATCH /api/books/{id}/return_book
pub async fn return_book(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<LoanView>>> {
    let loan = state
        .loan_service
        .return_current_loan(&auth, parse_id(&id)?)
        .await?;
    let view = state.loan_service.view(loan.id).await?;
    Ok(Json(ApiResponse::ok(view)))
}

fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(AppError::validation(format!(
            "Invalid value for available: '{raw}'"
        ))),
    }
}
