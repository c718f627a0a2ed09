use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo_types::User;
use crate::error::ApiError;
use crate::state::AppState;

/// The user record resolved from the request's bearer token. Lives for one
/// request; handlers take ownership of it.
pub struct CurrentUser(pub User);

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Missing header, bad scheme, failed validation and an unknown
        // subject all surface as the same 401; only the log tells them apart.
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            warn!("missing or malformed Authorization header");
            ApiError::Unauthenticated
        })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            ApiError::Unauthenticated
        })?;

        let user = User::find_by_username(&state.db, &claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(username = %claims.sub, "token subject no longer exists");
                ApiError::Unauthenticated
            })?;

        Ok(CurrentUser(user))
    }
}

/// A role a route can demand. The constant is compared by exact string
/// equality against `User::role`.
pub trait RequiredRole {
    const NAME: &'static str;
}

pub struct Admin;

impl RequiredRole for Admin {
    const NAME: &'static str = "admin";
}

/// Narrows `CurrentUser` to identities holding the required role. On a
/// match the resolved user passes through unchanged; a mismatch is 403,
/// distinct from the 401s above because the identity was established.
pub struct RequireRole<R: RequiredRole>(pub User, pub PhantomData<R>);

pub(crate) fn ensure_role(user: &User, required: &str) -> Result<(), ApiError> {
    if user.role == required {
        Ok(())
    } else {
        warn!(username = %user.username, role = %user.role, required, "role check failed");
        Err(ApiError::Forbidden)
    }
}

#[async_trait]
impl<R> FromRequestParts<AppState> for RequireRole<R>
where
    R: RequiredRole + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        ensure_role(&user, R::NAME)?;
        Ok(RequireRole(user, PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn user_with_role(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            password_hash: String::new(),
            role: role.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn bearer_token_requires_bearer_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwdw=="),
        );
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));
    }

    #[test]
    fn ensure_role_accepts_exact_match() {
        let admin = user_with_role("admin");
        assert!(ensure_role(&admin, "admin").is_ok());
    }

    #[test]
    fn ensure_role_rejects_other_roles_with_forbidden() {
        let user = user_with_role("user");
        match ensure_role(&user, "admin") {
            Err(ApiError::Forbidden) => {}
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }
}
