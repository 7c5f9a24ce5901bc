use actix_web::{web, HttpResponse};

use crate::error::AppResult;
use crate::models::PagePayload;
use crate::services::{ContentService, ThemeService};
use crate::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(get_page));
}

/// Everything the public page renders from. Never fails on a store read;
/// `degraded` tells the client it is looking at defaults.
async fn get_page(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let (content, content_degraded) = ContentService::new(&state.db).load_resolved().await;
    let (theme, theme_degraded) = ThemeService::new(&state.db).load_resolved().await;

    Ok(HttpResponse::Ok().json(PagePayload {
        content,
        theme,
        degraded: content_degraded || theme_degraded,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::test_state;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_page_payload() {
        let (state, _dir) = test_state().await;
        ContentService::new(&state.db)
            .upsert_field("hero", "buttonText", "Book a Call", None)
            .await
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(web::scope("/page").configure(create_routes)),
        )
        .await;

        let req = test::TestRequest::get().uri("/page").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["degraded"], false);
        assert_eq!(body["content"]["hero"]["buttonText"], "Book a Call");
        assert_eq!(body["content"]["services"]["title"], "How I Can Help");
        assert_eq!(body["theme"]["secondaryColor"], "#a855f7");
    }

    #[actix_web::test]
    async fn test_page_degrades_when_store_unreadable() {
        let (state, _dir) = test_state().await;
        sqlx::query("DROP TABLE theme_settings")
            .execute(state.db.pool())
            .await
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(web::scope("/page").configure(create_routes)),
        )
        .await;

        let req = test::TestRequest::get().uri("/page").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["degraded"], true);
        assert_eq!(body["theme"]["fontFamily"], "Montserrat");
    }
}
