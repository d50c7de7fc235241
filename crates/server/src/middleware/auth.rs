//! Authentication extractors.
//!
//! Token issuance (login, registration, refresh) is handled by a separate
//! conventional service; this backend only resolves `Authorization: Bearer`
//! tokens against the `api_tokens` table.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};

use crate::db::UserRepository;
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     format!("hello, {}", user.email)
/// }
/// ```
pub struct CurrentUser(pub User);

/// Extractor that requires an authenticated admin user.
pub struct AdminUser(pub User);

/// Rejection for failed authentication.
pub enum AuthRejection {
    /// No token, or the token is unknown.
    Unauthorized,
    /// The user is authenticated but not an admin.
    Forbidden,
    /// Token lookup failed at the storage layer.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

async fn resolve_user<S>(parts: &Parts, state: &S) -> Result<User, AuthRejection>
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    let state = AppState::from_ref(state);

    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AuthRejection::Unauthorized)?;

    UserRepository::new(state.pool())
        .get_by_token(token)
        .await
        .map_err(|_| AuthRejection::Internal)?
        .ok_or(AuthRejection::Unauthorized)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = resolve_user(parts, state).await?;
        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = resolve_user(parts, state).await?;
        if !user.is_admin {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}
