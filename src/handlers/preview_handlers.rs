use actix_web::{HttpResponse, web};

use crate::errors::AppError;
use crate::state::AppState;

/// GET /previews/{token} — bytes of a live preview image.
pub async fn show(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let token = path.into_inner();
    let preview = state.previews.get(&token).ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok()
        .content_type(preview.content_type)
        .insert_header(("Cache-Control", "no-store"))
        .body(preview.bytes.to_vec()))
}
