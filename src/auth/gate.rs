//! Request extractors that turn a bearer token into a stored user.
//!
//! Every way authentication can fail produces the same 401 response. The
//! concrete reason only shows up in the debug log.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{db::UserRepository, error::AppError, models::user::User, AppState};

/// The user behind a valid bearer token.
///
/// ```rust,ignore
/// async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
///     Json(user)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// A [`CurrentUser`] whose stored record has the admin flag set.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let Some(token) = header.and_then(bearer_token) else {
            tracing::debug!("missing or malformed authorization header");
            return Err(AppError::Unauthenticated);
        };

        let claims = state.tokens.verify_session(token).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            AppError::Unauthenticated
        })?;

        let user_id: i64 = claims.sub.parse().map_err(|_| {
            tracing::debug!(sub = %claims.sub, "token subject is not a user id");
            AppError::Unauthenticated
        })?;

        let user = UserRepository::new(&state.db)
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| {
                tracing::debug!(user_id, "token subject no longer exists");
                AppError::Unauthenticated
            })?;

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        require_admin(user).map(AdminUser)
    }
}

/// Checks the stored admin flag, not the claim in the token.
pub fn require_admin(user: User) -> Result<User, AppError> {
    if user.is_admin {
        Ok(user)
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}

/// The credentials of a `Bearer` authorization header. The scheme is matched
/// case-insensitively.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
