use actix_web::{guard, web, HttpResponse};
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::{AdminMiddleware, AuthUser};
use crate::models::{InquiryCountResponse, InquiryDeleteResponse, InquiryForm};
use crate::services::{AuthService, InquiryService};
use crate::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/count")
            .wrap(AdminMiddleware)
            .route(web::get().to(count_inquiries)),
    )
    .service(web::resource("").guard(guard::Post()).to(submit_inquiry))
    .service(
        web::resource("")
            .guard(guard::Get())
            .wrap(AdminMiddleware)
            .to(list_inquiries),
    )
    .service(
        web::resource("/{id}")
            .wrap(AdminMiddleware)
            .route(web::delete().to(delete_inquiry)),
    );
}

async fn submit_inquiry(
    state: web::Data<AppState>,
    form: web::Json<InquiryForm>,
) -> AppResult<HttpResponse> {
    let form = form.normalized()?;
    let inquiry = InquiryService::new(&state.db).create_inquiry(&form).await?;

    // the inquiry is stored either way; delivery problems are only logged
    let notified = state.notifier.notify_new_inquiry(&inquiry).await;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "id": inquiry.id,
        "notified": notified,
    })))
}

async fn list_inquiries(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let inquiries = InquiryService::new(&state.db).get_inquiries().await?;
    Ok(HttpResponse::Ok().json(inquiries))
}

async fn count_inquiries(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let count = InquiryService::new(&state.db).count_inquiries().await?;
    Ok(HttpResponse::Ok().json(InquiryCountResponse { count }))
}

async fn delete_inquiry(
    state: web::Data<AppState>,
    auth_user: AuthUser,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    // the token may outlive the account; check again before destroying data
    AuthService::new(&state.db)
        .ensure_active_session(auth_user.id())
        .await?;

    let service = InquiryService::new(&state.db);
    service.delete_inquiry_verified(&id).await?;
    let inquiries = service.get_inquiries().await?;

    tracing::info!("{} deleted inquiry {}", auth_user.email, id);

    Ok(HttpResponse::Ok().json(InquiryDeleteResponse {
        deleted: true,
        id,
        inquiries,
    }))
}
