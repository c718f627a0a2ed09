use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, MeResponse, PublicUser, RegisterRequest, TokenResponse},
        extractors::{Admin, CurrentUser, RequireRole},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::is_unique_violation,
        repo_types::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/users", get(list_users))
}

// No trimming or lowercasing: usernames are case-sensitive.
fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex =
            Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{2,31}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    if !is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err(ApiError::Validation("Invalid username".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::Validation("Password too short".into()));
    }

    // Friendly pre-check; the UNIQUE constraint below stays the authority
    if User::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        warn!(username = %payload.username, "username already registered");
        return Err(ApiError::Conflict("Username already taken"));
    }

    let hash = hash_password(&payload.password)?;

    let user = match User::create(&state.db, &payload.username, &hash).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(username = %payload.username, "username already registered");
            return Err(ApiError::Conflict("Username already taken"));
        }
        Err(e) => return Err(ApiError::Internal(e.into())),
    };

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(Json(PublicUser {
        id: user.id,
        username: user.username,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    // Unknown username and wrong password must be indistinguishable to the
    // client; the sub-cause only reaches the log.
    let user = match User::find_by_username(&state.db, &payload.username).await? {
        Some(u) => u,
        None => {
            warn!(username = %payload.username, "login with unknown username");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user.username)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(TokenResponse::bearer(token)))
}

#[instrument(skip_all)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: user.id,
        username: user.username,
        role: user.role,
    })
}

#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    RequireRole(admin, _): RequireRole<Admin>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = User::list_all(&state.db).await?;
    info!(admin = %admin.username, count = users.len(), "admin listed users");
    Ok(Json(users))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn username_charset_and_length() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("bob_2024"));
        assert!(is_valid_username("a.b-c"));

        assert!(!is_valid_username(""));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("почта@пример"));
        assert!(!is_valid_username(&"x".repeat(33)));
    }

    #[test]
    fn token_response_is_bearer() {
        let res = TokenResponse::bearer("tok".into());
        let json = serde_json::to_string(&res).unwrap();
        assert!(json.contains("\"access_token\":\"tok\""));
        assert!(json.contains("\"token_type\":\"bearer\""));
    }

    #[test]
    fn user_json_never_contains_the_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            role: "user".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("alice"));
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
    }
}
