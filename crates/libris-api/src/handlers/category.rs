//! Category handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use libris_core::types::PageResponse;
use libris_entity::category::{Category, CategoryWithCount};

use super::page_from;
use crate::dto::request::{CreateCategoryRequest, SearchQuery, UpdateCategoryRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson, parse_id};
use crate::state::AppState;

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<CategoryWithCount>>>> {
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());
    let categories = state
        .category_service
        .list(search, page_from(query.page, query.per_page))
        .await?;
    Ok(Json(ApiResponse::ok(categories)))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Category>>> {
    let category = state.category_service.get(parse_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(category)))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let category = state.category_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(category))))
}

/// PUT /api/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateCategoryRequest>,
) -> ApiResult<Json<ApiResponse<Category>>> {
    let category = state
        .category_service
        .update(&auth, req.into_update(parse_id(&id)?))
        .await?;
    Ok(Json(ApiResponse::ok(category)))
}

/// DELETE /api/categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.category_service.delete(&auth, parse_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Category was successfully deleted.",
    ))))
}
