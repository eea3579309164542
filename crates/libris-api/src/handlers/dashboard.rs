//! Dashboard handler.

use axum::Json;
use axum::extract::State;

use libris_service::dashboard::Dashboard;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Dashboard>>> {
    let dashboard = state.dashboard_service.build(&auth).await?;
    Ok(Json(ApiResponse::ok(dashboard)))
}
