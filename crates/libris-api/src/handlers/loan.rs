//! Loan handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use libris_core::error::AppError;
use libris_core::types::PageResponse;
use libris_entity::loan::LoanStatus;
use libris_service::loan::LoanView;

use super::page_from;
use crate::dto::request::{CreateLoanRequest, LoanQuery};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson, parse_id};
use crate::state::AppState;

/// GET /api/loans
pub async fn list_loans(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LoanQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<LoanView>>>> {
    let status = query
        .filter
        .as_deref()
        .filter(|f| !f.is_empty())
        .map(str::parse::<LoanStatus>)
        .transpose()?;
    let all = match query.scope.as_deref() {
        None | Some("") | Some("mine") => false,
        Some("all") => true,
        Some(other) => {
            return Err(AppError::validation(format!("Invalid scope: '{other}'")).into());
        }
    };

    let loans = state
        .loan_service
        .list(&auth, status, all, page_from(query.page, query.per_page))
        .await?;
    Ok(Json(ApiResponse::ok(loans)))
}

/// GET /api/loans/{id}
pub async fn get_loan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<LoanView>>> {
    let loan = state.loan_service.get(&auth, parse_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(loan)))
}

/// POST /api/loans
pub async fn create_loan(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateLoanRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<LoanView>>)> {
    let loan = state
        .loan_service
        .borrow(&auth, req.book_id, req.due_date)
        .await?;
    let view = state.loan_service.view(loan.id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(view))))
}

/// PATCH /api/loans/{id}/return
pub async fn return_loan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<LoanView>>> {
    let loan = state
        .loan_service
        .return_loan(&auth, parse_id(&id)?)
        .await?;
    let view = state.loan_service.view(loan.id).await?;
    Ok(Json(ApiResponse::ok(view)))
}
