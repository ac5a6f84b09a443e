use axum::Router;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    db::{CategoryRepository, ProductRepository},
    handlers::{
        addresses, auth, catalog::crud_routes, health, orders, payment_methods, reviews, uploads,
    },
    AppState,
};

pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;
    let uploads_dir = state.uploads.dir().to_path_buf();

    Router::new()
        .merge(health::routes())
        .nest("/auth", auth::routes())
        .nest("/addresses", addresses::routes())
        .nest("/payment_methods", payment_methods::routes())
        .nest("/reviews", reviews::routes())
        .nest("/orders", orders::routes())
        .nest("/categories", crud_routes::<CategoryRepository>())
        .nest("/products", crud_routes::<ProductRepository>())
        .merge(uploads::routes(max_upload_bytes))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
