use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::{
    auth::CurrentUser,
    db::{is_unique_violation, UserRepository},
    error::AppError,
    extract::ValidatedJson,
    models::user::{normalize_email, AuthResponse, CreateUser, LoginPayload, UpdateUser, User},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/admin/login", post(admin_login))
        .route("/me", get(me).put(update_me))
}

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let email = normalize_email(&payload.email);
    let users = UserRepository::new(&state.db);

    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = state.credentials.hash_blocking(payload.password).await?;

    // A concurrent registration can still win the race to the unique index.
    let user = users
        .create(&email, payload.name.as_deref(), &password_hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Email already registered".to_string())
            } else {
                AppError::from(e)
            }
        })?;

    tracing::info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = authenticate(&state, payload).await?;
    issue(&state, &user)
}

/// Same as [`login`], but only for admins.
pub async fn admin_login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = authenticate(&state, payload).await?;
    if !user.is_admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    issue(&state, &user)
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(changes): ValidatedJson<UpdateUser>,
) -> Result<Json<User>, AppError> {
    if changes.is_empty() {
        return Ok(Json(user));
    }

    let users = UserRepository::new(&state.db);
    let new_email = changes
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|email| *email != user.email);

    if let Some(email) = new_email.as_deref() {
        if users.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }
    }

    let updated = users
        .update_profile(&user, &changes, new_email.as_deref())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Email already in use".to_string())
            } else {
                AppError::from(e)
            }
        })?;

    Ok(Json(updated))
}

/// Resolve email and password to an active user.
///
/// Unknown email and wrong password are indistinguishable to the caller.
async fn authenticate(state: &AppState, payload: LoginPayload) -> Result<User, AppError> {
    let email = normalize_email(&payload.email);
    let Some(user) = UserRepository::new(&state.db).find_by_email(&email).await? else {
        tracing::debug!("login for unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let valid = state
        .credentials
        .verify_blocking(payload.password, user.password_hash.clone())
        .await;
    if !valid {
        tracing::debug!(user_id = user.id, "login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    if !user.is_active {
        return Err(AppError::Forbidden("Inactive user".to_string()));
    }

    Ok(user)
}

fn issue(state: &AppState, user: &User) -> Result<Json<AuthResponse>, AppError> {
    let token = state.tokens.issue_session(user.id, user.is_admin)?;
    tracing::info!(user_id = user.id, "session issued");
    Ok(Json(AuthResponse::bearer(token)))
}
