use actix_web::{guard, web, HttpResponse};
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::AdminMiddleware;
use crate::models::ThemeForm;
use crate::services::ThemeService;
use crate::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/revert")
            .wrap(AdminMiddleware)
            .route(web::post().to(revert_theme)),
    )
    .service(web::resource("").guard(guard::Get()).to(get_theme))
    .service(
        web::resource("")
            .guard(guard::Post())
            .wrap(AdminMiddleware)
            .to(save_theme),
    );
}

async fn get_theme(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let (theme, degraded) = ThemeService::new(&state.db).load_resolved().await;
    Ok(HttpResponse::Ok().json(json!({ "theme": theme, "degraded": degraded })))
}

async fn save_theme(
    state: web::Data<AppState>,
    form: web::Json<ThemeForm>,
) -> AppResult<HttpResponse> {
    let (report, theme) = ThemeService::new(&state.db).save_theme(&form).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": report.success,
        "report": report,
        "theme": theme,
    })))
}

async fn revert_theme(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let (report, theme) = ThemeService::new(&state.db).revert_theme().await;
    if report.success {
        tracing::info!("Theme reverted to defaults");
    }
    Ok(HttpResponse::Ok().json(json!({
        "success": report.success,
        "report": report,
        "theme": theme,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{admin_bearer, test_state};
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_theme_save_and_revert() {
        let (state, _dir) = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(web::scope("/theme").configure(create_routes)),
        )
        .await;
        let auth = admin_bearer(&state).await;

        let req = test::TestRequest::get().uri("/theme").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["theme"]["primaryColor"], "#ec4899");

        let req = test::TestRequest::post()
            .uri("/theme")
            .insert_header(auth.clone())
            .set_json(json!({"primaryColor": "#0f172a", "fontFamily": "Inter"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["report"]["saved"], 2);
        assert_eq!(body["theme"]["primaryColor"], "#0f172a");
        assert_eq!(body["theme"]["accentColor"], "#10b981");

        let req = test::TestRequest::post()
            .uri("/theme")
            .insert_header(auth.clone())
            .set_json(json!({"glow": "on"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/theme/revert")
            .insert_header(auth)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["report"]["saved"], 4);

        let req = test::TestRequest::get().uri("/theme").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["theme"]["primaryColor"], "#ec4899");
        assert_eq!(body["theme"]["fontFamily"], "Montserrat");
    }
}
