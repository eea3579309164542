//! User self-service handlers.

use axum::Json;
use axum::extract::State;

use libris_service::user::UserProfile;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<UserProfile>>> {
    let profile = state.user_service.profile(&auth).await?;
    Ok(Json(ApiResponse::ok(profile)))
}
