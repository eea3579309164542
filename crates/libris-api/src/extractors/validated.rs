//! JSON body extractor that runs `validator` rules.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use libris_core::error::AppError;
use libris_core::types::ValidationErrors;

use crate::error::ApiError;

/// A JSON body that deserialized and passed its `#[validate]` rules.
///
/// Malformed JSON is a 400; rule violations are a 422 with field errors.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        value.validate().map_err(field_errors)?;
        Ok(Self(value))
    }
}

/// Flatten `validator` output into per-field messages.
pub fn field_errors(errors: validator::ValidationErrors) -> ValidationErrors {
    let mut out = ValidationErrors::new();
    for (field, list) in errors.field_errors() {
        for error in list {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            out.add(field.to_string(), message);
        }
    }
    out
}
