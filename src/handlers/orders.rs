use axum::{extract::State, routing::get, Json, Router};

use crate::{
    auth::CurrentUser, db::OrderRepository, error::AppError, models::order::Order, AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/me", get(history))
}

/// Orders are linked to users through the client record sharing their email.
pub async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = OrderRepository::new(&state.db)
        .history_for_email(&user.email)
        .await?;
    Ok(Json(orders))
}
