use actix_session::Session;
use rand::Rng;

use crate::errors::AppError;

/// Header carrying the token on requests that aren't form posts.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// The session's CSRF token, issued on first use.
pub fn get_or_create_token(session: &Session) -> Result<String, AppError> {
    if let Ok(Some(token)) = session.get::<String>("csrf_token") {
        return Ok(token);
    }
    let token = generate_token();
    session
        .insert("csrf_token", &token)
        .map_err(|e| AppError::Session(format!("Failed to store CSRF token: {e}")))?;
    Ok(token)
}

/// Validate the submitted CSRF token against the session token.
pub fn validate_csrf(session: &Session, submitted: &str) -> Result<(), AppError> {
    let stored = session
        .get::<String>("csrf_token")
        .unwrap_or(None)
        .unwrap_or_default();
    if stored.is_empty() || !constant_time_eq(&stored, submitted) {
        return Err(AppError::Csrf);
    }
    Ok(())
}

fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Compares every byte regardless of where the first difference is.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
