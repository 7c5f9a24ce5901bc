use actix_web::{
    cookie::{Cookie, SameSite},
    http::header,
    web, HttpResponse,
};
use serde_json::json;
use validator::Validate;

use crate::error::{clear_token_cookie, AppError, AppResult};
use crate::middleware::{AuthMiddleware, AuthUser};
use crate::models::{SessionResponse, SigninRequest, UserResponse};
use crate::services::{AuthService, UserService};
use crate::utils::auth::{create_jwt, parse_duration};
use crate::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/signin", web::post().to(signin))
        .route("/signout", web::get().to(signout))
        .service(
            web::resource("")
                .wrap(AuthMiddleware)
                .route(web::get().to(get_session_user)),
        );
}

async fn get_session_user(auth_user: AuthUser) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserResponse::from(auth_user.user)))
}

async fn signin(
    state: web::Data<AppState>,
    req: web::Json<SigninRequest>,
) -> AppResult<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let auth_service = AuthService::new(&state.db);
    let user_service = UserService::new(&state.db);

    let user_id = auth_service
        .authenticate(&req.email.trim().to_lowercase(), &req.password)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let user = user_service
        .get_user_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let config = &state.config;
    let token = create_jwt(&user.id, &config.webui_secret_key, &config.jwt_expires_in)?;

    let expires_at = chrono::Utc::now()
        .checked_add_signed(parse_duration(&config.jwt_expires_in)?)
        .map(|dt| dt.timestamp());

    tracing::info!("Admin {} signed in", user.email);

    let session_response = SessionResponse {
        token: token.clone(),
        token_type: "Bearer".to_string(),
        expires_at,
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    };

    let mut cookie = Cookie::new("token", token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::None);
    cookie.set_secure(true);
    cookie.set_path("/");

    if let Some(exp) = expires_at {
        cookie.set_expires(time::OffsetDateTime::from_unix_timestamp(exp).ok());
    }

    Ok(HttpResponse::Ok()
        .append_header((header::SET_COOKIE, cookie.to_string()))
        .json(session_response))
}

async fn signout() -> HttpResponse {
    HttpResponse::Ok()
        .append_header((header::SET_COOKIE, clear_token_cookie().to_string()))
        .json(json!({"status": true}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{admin_bearer, test_state, ADMIN_EMAIL, ADMIN_PASSWORD};
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_signin_sets_cookie_and_session_works() {
        let (state, _dir) = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(web::scope("/auths").configure(create_routes)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auths/signin")
            .set_json(json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("token="));

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["role"], "admin");
        let token = body["token"].as_str().unwrap();

        let req = test::TestRequest::get()
            .uri("/auths")
            .cookie(Cookie::new("token", token.to_string()))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["email"], ADMIN_EMAIL);

        let req = test::TestRequest::get()
            .uri("/auths")
            .insert_header(admin_bearer(&state).await)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_wrong_password_rejected() {
        let (state, _dir) = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(web::scope("/auths").configure(create_routes)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auths/signin")
            .set_json(json!({"email": ADMIN_EMAIL, "password": "nope"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_session_requires_token() {
        let (state, _dir) = test_state().await;
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(web::scope("/auths").configure(create_routes)),
        )
        .await;

        let req = test::TestRequest::get().uri("/auths").to_request();
        let resp = test::try_call_service(&app, req).await;
        let status = match resp {
            Ok(resp) => resp.status(),
            Err(e) => e.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
