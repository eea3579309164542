//! Author handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use libris_core::types::PageResponse;
use libris_entity::author::{Author, AuthorWithCount};

use super::page_from;
use crate::dto::request::{CreateAuthorRequest, SearchQuery, UpdateAuthorRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson, parse_id};
use crate::state::AppState;

/// GET /api/authors
pub async fn list_authors(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<AuthorWithCount>>>> {
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());
    let authors = state
        .author_service
        .list(search, page_from(query.page, query.per_page))
        .await?;
    Ok(Json(ApiResponse::ok(authors)))
}

/// GET /api/authors/{id}
pub async fn get_author(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Author>>> {
    let author = state.author_service.get(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(author)))
}

/// POST /api/authors
pub async fn create_author(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateAuthorRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Author>>)> {
    let author = state.author_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(author))))
}

/// PUT /api/authors/{id}
pub async fn update_author(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateAuthorRequest>,
) -> ApiResult<Json<ApiResponse<Author>>> {
    let author = state
        .author_service
        .update(&auth, req.into_update(parse_id(&id)?))
        .await?;
    Ok(Json(ApiResponse::ok(author)))
}

/// DELETE /api/authors/{id}
pub async fn delete_author(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.author_service.delete(&auth, parse_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Author was successfully deleted.",
    ))))
}
