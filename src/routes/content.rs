use actix_web::{guard, web, HttpResponse};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::{AdminMiddleware, AuthUser};
use crate::models::{BatchSaveForm, FieldSaveResponse, FieldUpdateForm, Section};
use crate::services::ContentService;
use crate::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    // literal paths first so they are not captured by `/{section}`
    cfg.service(
        web::resource("/field")
            .wrap(AdminMiddleware)
            .route(web::post().to(save_field)),
    )
    .service(
        web::resource("/batch")
            .wrap(AdminMiddleware)
            .route(web::post().to(save_batch)),
    )
    .service(web::resource("").guard(guard::Get()).to(get_content))
    .service(
        web::resource("/{section}/revert")
            .wrap(AdminMiddleware)
            .route(web::post().to(revert_section)),
    )
    .service(
        web::resource("/{section}")
            .guard(guard::Get())
            .to(get_section),
    );
}

async fn get_content(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let (content, degraded) = ContentService::new(&state.db).load_resolved().await;
    Ok(HttpResponse::Ok().json(json!({ "content": content, "degraded": degraded })))
}

async fn get_section(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let section = path.into_inner();
    let (mut content, degraded) = ContentService::new(&state.db).load_resolved().await;

    let fields = content
        .remove(&section)
        .ok_or_else(|| AppError::NotFound(format!("Section {} not found", section)))?;

    Ok(HttpResponse::Ok().json(json!({
        "section": section,
        "fields": fields,
        "degraded": degraded,
    })))
}

async fn save_field(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    form: web::Json<FieldUpdateForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let outcome = ContentService::new(&state.db)
        .upsert_field(&form.section, &form.field, &form.value, None)
        .await?;

    tracing::info!(
        "{} saved {}.{} ({:?}, {:?})",
        auth_user.email,
        form.section,
        form.field,
        form.source,
        outcome
    );

    Ok(HttpResponse::Ok().json(FieldSaveResponse {
        section: form.section,
        field: form.field,
        value: form.value,
        outcome,
    }))
}

async fn save_batch(
    state: web::Data<AppState>,
    form: web::Json<BatchSaveForm>,
) -> AppResult<HttpResponse> {
    let report = ContentService::new(&state.db).save_fields(&form.fields).await;
    Ok(HttpResponse::Ok().json(report))
}

async fn revert_section(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let name = path.into_inner();
    let section = Section::parse(&name)
        .ok_or_else(|| AppError::NotFound(format!("Section {} has no defaults", name)))?;

    let report = ContentService::new(&state.db).revert_section(section).await;
    tracing::info!("Reverted section {}: {}", section, report.message);

    Ok(HttpResponse::Ok().json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{admin_bearer, test_state};
    use actix_web::{http::StatusCode, test, App};

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .service(web::scope("/content").configure(create_routes)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_public_read_resolves_defaults() {
        let (state, _dir) = test_state().await;
        let app = app!(state);

        let req = test::TestRequest::get().uri("/content").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["degraded"], false);
        assert_eq!(body["content"]["hero"]["title"], "Strong. Confident. Empowered.");

        let req = test::TestRequest::get().uri("/content/about").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["fields"]["statsNumber"], "500+");

        let req = test::TestRequest::get().uri("/content/pricing").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_field_save_then_read() {
        let (state, _dir) = test_state().await;
        let app = app!(state);
        let auth = admin_bearer(&state).await;

        let req = test::TestRequest::post()
            .uri("/content/field")
            .insert_header(auth.clone())
            .set_json(json!({"section": "hero", "field": "title", "value": "Train Smart", "source": "ai"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["outcome"], "inserted");

        let req = test::TestRequest::get().uri("/content/hero").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["fields"]["title"], "Train Smart");
    }

    #[actix_web::test]
    async fn test_field_save_requires_admin() {
        let (state, _dir) = test_state().await;
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/content/field")
            .set_json(json!({"section": "hero", "field": "title", "value": "x"}))
            .to_request();
        let status = match test::try_call_service(&app, req).await {
            Ok(resp) => resp.status(),
            Err(e) => e.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_batch_reports_partial_failure() {
        let (state, _dir) = test_state().await;
        let app = app!(state);
        let auth = admin_bearer(&state).await;

        let req = test::TestRequest::post()
            .uri("/content/batch")
            .insert_header(auth)
            .set_json(json!({"fields": [
                {"section": "hero", "field": "title", "value": "One"},
                {"section": "hero", "field": "bad-name", "value": "Two"},
                {"section": "hero", "field": "tagline", "value": ""}
            ]}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["saved"], 1);
        assert_eq!(body["failed"], 1);
        assert_eq!(body["failures"][0]["field"], "bad-name");
    }

    #[actix_web::test]
    async fn test_revert_section() {
        let (state, _dir) = test_state().await;
        let app = app!(state);
        let auth = admin_bearer(&state).await;

        let req = test::TestRequest::post()
            .uri("/content/testimonials/revert")
            .insert_header(auth.clone())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["saved"], Section::Testimonials.defaults().len());

        let req = test::TestRequest::post()
            .uri("/content/pricing/revert")
            .insert_header(auth)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
