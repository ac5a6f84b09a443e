//! Routes for any [`CrudRepository`]: public reads, admin-only writes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::{
    auth::AdminUser,
    db::{CrudRepository, Page},
    error::AppError,
    extract::{ValidatedJson, ValidatedPath, ValidatedQuery},
    AppState,
};

pub fn crud_routes<R: CrudRepository>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<R>).post(create::<R>))
        .route("/:id", get(show::<R>).put(update::<R>).delete(remove::<R>))
}

async fn list<R: CrudRepository>(
    State(state): State<AppState>,
    ValidatedQuery(page): ValidatedQuery<Page>,
) -> Result<Json<Vec<R::Entity>>, AppError> {
    Ok(Json(R::list(&state.db, page).await?))
}

async fn show<R: CrudRepository>(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<R::Entity>, AppError> {
    R::find(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(not_found::<R>)
}

async fn create<R: CrudRepository>(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ValidatedJson(payload): ValidatedJson<R::Payload>,
) -> Result<(StatusCode, Json<R::Entity>), AppError> {
    let entity = R::insert(&state.db, &payload).await?;
    Ok((StatusCode::CREATED, Json(entity)))
}

async fn update<R: CrudRepository>(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(payload): ValidatedJson<R::Payload>,
) -> Result<Json<R::Entity>, AppError> {
    R::update(&state.db, id, &payload)
        .await?
        .map(Json)
        .ok_or_else(not_found::<R>)
}

async fn remove<R: CrudRepository>(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<StatusCode, AppError> {
    if R::delete(&state.db, id).await? {
        tracing::info!(table = R::TABLE, id, "deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found::<R>())
    }
}

fn not_found<R: CrudRepository>() -> AppError {
    AppError::NotFound(format!("{} not found", R::NAME))
}
