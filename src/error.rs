use actix_web::{
    cookie::{Cookie, SameSite},
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The store refused the operation because of its access policies.
    #[error("Access policy denied: {0}")]
    PolicyDenied(String),

    /// A required setting is missing; raised before any network call.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl AppError {
    /// Translate a store error, recognising access-policy denials so callers
    /// can show remediation instead of a generic failure.
    pub fn from_store(err: sqlx::Error, table: &str) -> AppError {
        if let Some(db_err) = err.as_database_error() {
            let code = db_err.code();
            if is_policy_denial(code.as_deref(), db_err.message()) {
                tracing::warn!("Store denied access to {}: {}", table, db_err.message());
                return AppError::policy_denied(table);
            }
        }
        AppError::Database(err)
    }

    pub fn policy_denied(table: &str) -> AppError {
        AppError::PolicyDenied(policy_remediation(table))
    }

    /// Status code and client-facing message. Server-side faults are logged here.
    pub fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::Validation(ref e) => (StatusCode::BAD_REQUEST, e.clone()),
            AppError::NotFound(ref e) => (StatusCode::NOT_FOUND, e.clone()),
            AppError::Unauthorized(ref e) => (StatusCode::UNAUTHORIZED, e.clone()),
            AppError::Forbidden(ref e) => (StatusCode::FORBIDDEN, e.clone()),
            AppError::BadRequest(ref e) => (StatusCode::BAD_REQUEST, e.clone()),
            AppError::PolicyDenied(ref e) => (StatusCode::FORBIDDEN, e.clone()),
            AppError::Config(ref e) => {
                tracing::error!("Configuration error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.clone())
            }
            AppError::InternalServerError(ref e) => {
                tracing::error!("Internal server error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.clone())
            }
            AppError::Jwt(ref e) => {
                tracing::debug!("JWT error: {:?}", e);
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            AppError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
            AppError::ExternalServiceError(ref e) => {
                tracing::error!("External service error: {:?}", e);
                (StatusCode::BAD_GATEWAY, e.clone())
            }
            AppError::Http(ref e) => {
                tracing::error!("HTTP error: {:?}", e);
                (StatusCode::BAD_GATEWAY, "HTTP request failed".to_string())
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_message) = self.status_and_detail();

        let body = ErrorResponse {
            detail: error_message,
        };

        // CORS headers come from the Cors wrapper, which maps them onto
        // error responses as well
        let mut response_builder = HttpResponse::build(status);

        if matches!(
            self,
            AppError::Unauthorized(_) | AppError::Jwt(_) | AppError::InvalidCredentials
        ) {
            response_builder.insert_header((header::SET_COOKIE, clear_token_cookie().to_string()));
        }

        response_builder.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PolicyDenied(_) => StatusCode::FORBIDDEN,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            AppError::Http(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Expired cookie used to drop the session on auth failures and sign-out.
pub fn clear_token_cookie() -> Cookie<'static> {
    let mut token_cookie = Cookie::new("token", "");
    token_cookie.set_http_only(true);
    token_cookie.set_same_site(SameSite::None);
    token_cookie.set_secure(true);
    token_cookie.set_path("/");
    token_cookie.set_max_age(time::Duration::seconds(-1));
    token_cookie
}

/// Recognises denials by SQLSTATE 42501 (insufficient privilege), SQLite
/// READONLY/AUTH result codes, or row-level-security wording.
pub fn is_policy_denial(code: Option<&str>, message: &str) -> bool {
    if let Some(code) = code {
        // 8 = SQLITE_READONLY, 23 = SQLITE_AUTH; extended codes keep the low byte
        let sqlite_primary = code.parse::<i32>().ok().map(|c| c & 0xff);
        if code == "42501" || matches!(sqlite_primary, Some(8) | Some(23)) {
            return true;
        }
    }

    let message = message.to_lowercase();
    message.contains("row-level security")
        || message.contains("permission denied")
        || message.contains("readonly database")
        || message.contains("not authorized")
}

fn policy_remediation(table: &str) -> String {
    format!(
        "The data store refused this operation on `{}` because of its access policies. \
         Make sure the admin role is allowed to read, write and delete rows in that table \
         (row-level security policies or database file permissions), then try again.",
        table
    )
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_denial_detection() {
        assert!(is_policy_denial(Some("42501"), "insufficient privilege"));
        assert!(is_policy_denial(Some("8"), "attempt to write a readonly database"));
        assert!(is_policy_denial(Some("1032"), "attempt to write a readonly database"));
        assert!(is_policy_denial(
            None,
            "new row violates row-level security policy for table \"customer_inquiries\""
        ));
        assert!(!is_policy_denial(Some("2067"), "UNIQUE constraint failed"));
        assert!(!is_policy_denial(None, "connection reset by peer"));
    }

    #[test]
    fn test_status_mapping() {
        let (status, detail) = AppError::PolicyDenied("fix the policy".into()).status_and_detail();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(detail, "fix the policy");

        let (status, _) = AppError::Config("missing key".into()).status_and_detail();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = AppError::NotFound("Inquiry not found".into()).status_and_detail();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_response_leaves_cors_to_wrapper() {
        let resp = AppError::Unauthorized("No token".into()).error_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
        assert!(resp.headers().get(header::SET_COOKIE).is_some());
    }
}
