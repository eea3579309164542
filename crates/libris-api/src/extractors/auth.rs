//! `AuthUser` extractor: resolves the gateway-asserted user.
//!
//! Credentials are checked by the gateway in front of the service. It
//! forwards the authenticated account id in `X-User-Id`; this extractor
//! loads that account and builds the [`RequestContext`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use libris_core::error::AppError;
use libris_core::types::UserId;
use libris_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The acting user, available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing X-User-Id header"))?;

        let user_id: UserId = raw
            .trim()
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid X-User-Id header"))?;

        let user = state
            .user_service
            .find(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unknown user"))?;

        Ok(AuthUser(RequestContext::new(user, state.clock.now())))
    }
}
