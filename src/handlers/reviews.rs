//! Product reviews.
//!
//! Anyone can read reviews. Signed-in users write one review per product they
//! have bought; admins may review anything. Editing and deleting is reserved
//! for admins.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::{
    auth::{AdminUser, CurrentUser},
    db::{is_unique_violation, CrudRepository, Page, ProductRepository, ReviewRepository},
    error::AppError,
    extract::{ValidatedJson, ValidatedPath, ValidatedQuery},
    models::review::{CreateReview, Review, ReviewSummary, UpdateReview},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create))
        .route("/me", get(mine))
        .route("/summary", get(summary))
        .route("/product/:product_id", get(for_product))
        .route("/:id", put(update).delete(remove))
}

pub async fn for_product(
    State(state): State<AppState>,
    ValidatedPath(product_id): ValidatedPath<i64>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = ReviewRepository::new(&state.db)
        .list_for_product(product_id)
        .await?;
    Ok(Json(reviews))
}

pub async fn summary(State(state): State<AppState>) -> Result<Json<Vec<ReviewSummary>>, AppError> {
    let summary = ReviewRepository::new(&state.db).summary().await?;
    Ok(Json(summary))
}

pub async fn mine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = ReviewRepository::new(&state.db)
        .list_for_user(user.id)
        .await?;
    Ok(Json(reviews))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateReview>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    if ProductRepository::find(&state.db, payload.product_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let reviews = ReviewRepository::new(&state.db);
    if !user.is_admin && !reviews.has_purchased(&user.email, payload.product_id).await? {
        return Err(AppError::Forbidden(
            "Only customers who bought this product can review it".to_string(),
        ));
    }

    if reviews
        .find_by_author(payload.product_id, user.id)
        .await?
        .is_some()
    {
        return Err(already_reviewed());
    }

    let id = reviews.create(user.id, &payload).await.map_err(|e| {
        if is_unique_violation(&e) {
            already_reviewed()
        } else {
            AppError::from(e)
        }
    })?;

    let review = reviews.find(id).await?.ok_or_else(not_found)?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn list_all(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ValidatedQuery(page): ValidatedQuery<Page>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = ReviewRepository::new(&state.db).list_all(page).await?;
    Ok(Json(reviews))
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(changes): ValidatedJson<UpdateReview>,
) -> Result<Json<Review>, AppError> {
    let reviews = ReviewRepository::new(&state.db);
    if !reviews.update(id, &changes).await? {
        return Err(not_found());
    }
    let review = reviews.find(id).await?.ok_or_else(not_found)?;
    Ok(Json(review))
}

pub async fn remove(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<StatusCode, AppError> {
    if ReviewRepository::new(&state.db).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

fn already_reviewed() -> AppError {
    AppError::Conflict("You already reviewed this product".to_string())
}

fn not_found() -> AppError {
    AppError::NotFound("Review not found".to_string())
}
