use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// HTTP header identifying the requesting user, set by the upstream
/// authentication layer.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the authenticated user's id.
///
/// Authentication itself happens upstream; a missing or unparseable header
/// is rejected as unauthenticated before any store access.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .map(CurrentUser)
            .ok_or(AppError::Unauthenticated)
    }
}
