//! The caller's address book. Addresses hang off the caller's client record,
//! which is created the first time any of these routes is hit.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::{
    auth::CurrentUser,
    db::{AddressRepository, ClientRepository},
    error::AppError,
    extract::{ValidatedJson, ValidatedPath},
    models::address::{Address, CreateAddress, UpdateAddress},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(list).post(create))
        .route("/me/:id", put(update).delete(remove))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Address>>, AppError> {
    let client = ClientRepository::new(&state.db).get_or_create(&user).await?;
    let addresses = AddressRepository::new(&state.db)
        .list_for_client(client.id)
        .await?;
    Ok(Json(addresses))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateAddress>,
) -> Result<(StatusCode, Json<Address>), AppError> {
    let client = ClientRepository::new(&state.db).get_or_create(&user).await?;
    let address = AddressRepository::new(&state.db)
        .create(client.id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(changes): ValidatedJson<UpdateAddress>,
) -> Result<Json<Address>, AppError> {
    let client = ClientRepository::new(&state.db).get_or_create(&user).await?;
    AddressRepository::new(&state.db)
        .update_owned(id, client.id, &changes)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<StatusCode, AppError> {
    let client = ClientRepository::new(&state.db).get_or_create(&user).await?;
    if AddressRepository::new(&state.db)
        .delete_owned(id, client.id)
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Address not found".to_string())
}
