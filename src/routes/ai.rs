use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::json;

use crate::services::rewrite::RewriteRequest;
use crate::AppState;

/// `POST /api/ai`. Answers `{improvedText}` or `{error}`; the suggestion is
/// not persisted here. Errors are 400 for bad input and 500 for everything
/// else, provider failures included.
pub async fn rewrite_content(
    state: web::Data<AppState>,
    request: web::Json<RewriteRequest>,
) -> HttpResponse {
    match state.rewrite.rewrite(&request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            let (status, detail) = e.status_and_detail();
            let status = if status == StatusCode::BAD_REQUEST {
                status
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            HttpResponse::build(status).json(json!({ "error": detail }))
        }
    }
}
