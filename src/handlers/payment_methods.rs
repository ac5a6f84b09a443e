use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::{
    auth::CurrentUser,
    db::PaymentMethodRepository,
    error::AppError,
    extract::{ValidatedJson, ValidatedPath},
    models::payment_method::{is_expired, CreatePaymentMethod, PaymentMethod, UpdatePaymentMethod},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", put(update).delete(remove))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<PaymentMethod>>, AppError> {
    let methods = PaymentMethodRepository::new(&state.db)
        .list_for_user(user.id)
        .await?;
    Ok(Json(methods))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreatePaymentMethod>,
) -> Result<(StatusCode, Json<PaymentMethod>), AppError> {
    ensure_not_expired(&state, payload.exp_month, payload.exp_year)?;
    let method = PaymentMethodRepository::new(&state.db)
        .create(user.id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(method)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(changes): ValidatedJson<UpdatePaymentMethod>,
) -> Result<Json<PaymentMethod>, AppError> {
    let repo = PaymentMethodRepository::new(&state.db);
    let current = repo.find_owned(id, user.id).await?.ok_or_else(not_found)?;

    // Any update is checked against the expiry it would leave behind.
    let exp_month = changes.exp_month.unwrap_or(current.exp_month);
    let exp_year = changes.exp_year.unwrap_or(current.exp_year);
    ensure_not_expired(&state, exp_month, exp_year)?;

    repo.update_owned(id, user.id, &changes)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<StatusCode, AppError> {
    if PaymentMethodRepository::new(&state.db)
        .delete_owned(id, user.id)
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

fn ensure_not_expired(state: &AppState, exp_month: i64, exp_year: i64) -> Result<(), AppError> {
    if is_expired(exp_month, exp_year, state.clock.now()) {
        return Err(AppError::Validation("Card is expired".to_string()));
    }
    Ok(())
}

fn not_found() -> AppError {
    AppError::NotFound("Payment method not found".to_string())
}
