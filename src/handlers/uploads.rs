use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header::HOST, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::{auth::AdminUser, error::AppError, storage::extension_for, AppState};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Files written here are served back by the static `/uploads` service, so
/// the upload route is registered with its full path next to it.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/uploads/products",
        post(upload_product_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
    )
}

/// Store a product image sent as the multipart field `file`.
pub async fn upload_product_image(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() != Some("file") {
            continue;
        }

        let is_image = field
            .content_type()
            .is_some_and(|mime| mime.starts_with("image/"));
        if !is_image {
            return Err(AppError::Validation("File must be an image".to_string()));
        }

        let extension = extension_for(field.file_name());
        let bytes = field.bytes().await.map_err(bad_multipart)?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Empty file".to_string()));
        }

        let filename = state.uploads.save(&bytes, &extension).await?;
        tracing::info!(admin_id = admin.id, %filename, "product image uploaded");

        let url = format!("{}/uploads/{}", base_url(&state, &headers), filename);
        return Ok((StatusCode::CREATED, Json(UploadResponse { url })));
    }

    Err(AppError::Validation("Missing multipart field `file`".to_string()))
}

fn base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.config.public_base_url {
        return base.clone();
    }
    headers
        .get(HOST)
        .and_then(|host| host.to_str().ok())
        .map(|host| format!("http://{host}"))
        .unwrap_or_default()
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(e.body_text())
}
