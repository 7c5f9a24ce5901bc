use crate::error::{AppError, AppResult};
use crate::models::Claims;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

pub fn create_jwt(user_id: &str, secret: &str, expires_in: &str) -> AppResult<String> {
    let expiration = parse_duration(expires_in)?;
    let exp = Utc::now()
        .checked_add_signed(expiration)
        .ok_or_else(|| AppError::InternalServerError("Invalid expiration time".to_string()))?
        .timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        exp: Some(exp),
        iat: Some(Utc::now().timestamp()),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn verify_jwt(token: &str, secret: &str) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

pub fn parse_duration(duration_str: &str) -> AppResult<Duration> {
    let duration_str = duration_str.trim();

    let parse = |value: &str| -> AppResult<i64> {
        value
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid duration format".to_string()))
    };

    if let Some(hours) = duration_str.strip_suffix('h') {
        Ok(Duration::hours(parse(hours)?))
    } else if let Some(days) = duration_str.strip_suffix('d') {
        Ok(Duration::days(parse(days)?))
    } else if let Some(minutes) = duration_str.strip_suffix('m') {
        Ok(Duration::minutes(parse(minutes)?))
    } else {
        // Default to hours
        Ok(Duration::hours(parse(duration_str)?))
    }
}

pub fn extract_bearer_token(auth_header: &str) -> Option<String> {
    auth_header.strip_prefix("Bearer ").map(|s| s.trim().to_string())
}
