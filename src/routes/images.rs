use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::AdminMiddleware;
use crate::models::validate_key_name;
use crate::services::ContentService;
use crate::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/upload")
            .wrap(AdminMiddleware)
            .route(web::post().to(upload_image)),
    );
}

async fn read_text(field: &mut actix_multipart::Field) -> AppResult<String> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Chunk error: {}", e)))?;
        data.extend_from_slice(&chunk);
    }
    String::from_utf8(data)
        .map(|s| s.trim().to_string())
        .map_err(|e| AppError::BadRequest(format!("Invalid form field: {}", e)))
}

// POST /upload - multipart `section`, `field`, `file`
async fn upload_image(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let max_bytes = state.config.max_upload_bytes;
    let mut section: Option<String> = None;
    let mut field_name: Option<String> = None;
    let mut file_data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;
        let content_disposition = field.content_disposition().cloned();
        let name = content_disposition
            .as_ref()
            .and_then(|cd| cd.get_name())
            .unwrap_or("")
            .to_string();

        match name.as_str() {
            "section" => section = Some(read_text(&mut field).await?),
            "field" => field_name = Some(read_text(&mut field).await?),
            "file" => {
                filename = content_disposition
                    .as_ref()
                    .and_then(|cd| cd.get_filename())
                    .map(|s| s.to_string());

                let mut data = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk =
                        chunk.map_err(|e| AppError::BadRequest(format!("Chunk error: {}", e)))?;
                    if data.len() + chunk.len() > max_bytes {
                        return Err(AppError::BadRequest(format!(
                            "File exceeds the {} byte upload limit",
                            max_bytes
                        )));
                    }
                    data.extend_from_slice(&chunk);
                }
                file_data = Some(data);
            }
            _ => {}
        }
    }

    let section =
        section.ok_or_else(|| AppError::BadRequest("section is required".to_string()))?;
    let field_name =
        field_name.ok_or_else(|| AppError::BadRequest("field is required".to_string()))?;
    let file_data = file_data
        .filter(|data| !data.is_empty())
        .ok_or_else(|| AppError::BadRequest("file is required".to_string()))?;

    validate_key_name("section", &section)?;
    validate_key_name("field", &field_name)?;

    let object_path = state
        .storage
        .upload_image(&section, &field_name, filename.as_deref(), &file_data)
        .await?;
    let url = state.storage.public_url(&object_path);

    let saved = ContentService::new(&state.db)
        .upsert_field(&section, &field_name, &url, Some(&url))
        .await;

    let outcome = match saved {
        Ok(outcome) => outcome,
        Err(e) => {
            // nothing references the object, drop it
            if let Err(remove_err) = state.storage.remove(&object_path).await {
                tracing::warn!("Failed to remove orphaned object {}: {}", object_path, remove_err);
            }
            return Err(e);
        }
    };

    tracing::info!("Uploaded {} for {}.{}", object_path, section, field_name);

    Ok(HttpResponse::Ok().json(json!({
        "path": object_path,
        "url": url,
        "section": section,
        "field": field_name,
        "outcome": outcome,
    })))
}
