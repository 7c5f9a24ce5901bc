use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::{AdminMiddleware, AuthUser};
use crate::models::UserResponse;
use crate::services::{ContentService, InquiryService, ThemeService};
use crate::state::{reduce, EditorAction, EditorState};
use crate::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/dashboard")
            .wrap(AdminMiddleware)
            .route(web::get().to(get_dashboard)),
    );
}

/// Initial editor state plus the settings clients need to drive it. Clients
/// poll `/inquiries/count` every `inquiry_refresh_secs` afterwards.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub editor: EditorState,
    pub inquiry_refresh_secs: u64,
    pub ai_enabled: bool,
    pub notifications_enabled: bool,
}

async fn get_dashboard(
    state: web::Data<AppState>,
    auth_user: AuthUser,
) -> AppResult<HttpResponse> {
    let (content, content_degraded) = ContentService::new(&state.db).load_resolved().await;
    let (theme, theme_degraded) = ThemeService::new(&state.db).load_resolved().await;
    let inquiry_count = InquiryService::new(&state.db).count_inquiries().await?;

    let editor = [
        EditorAction::SessionChanged(Some(UserResponse::from(auth_user.user))),
        EditorAction::LoadFinished(Ok((content, theme, content_degraded || theme_degraded))),
        EditorAction::InquiryCountRefreshed(inquiry_count),
    ]
    .into_iter()
    .fold(EditorState::default(), reduce);

    Ok(HttpResponse::Ok().json(DashboardResponse {
        editor,
        inquiry_refresh_secs: state.config.inquiry_refresh_secs,
        ai_enabled: state.rewrite.is_configured(),
        notifications_enabled: state.notifier.is_enabled(),
    }))
}
