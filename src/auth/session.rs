use actix_session::Session;
use rand::Rng;

use crate::errors::AppError;

const FORM_ID_KEY: &str = "form_id";

/// The form instance bound to this browser session, if one was opened.
pub fn get_form_id(session: &Session) -> Option<String> {
    session.get::<String>(FORM_ID_KEY).unwrap_or(None)
}

/// Return the session's form id, assigning a fresh one on first visit.
pub fn get_or_create_form_id(session: &Session) -> Result<String, AppError> {
    if let Some(id) = get_form_id(session) {
        return Ok(id);
    }
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    let id = hex::encode(bytes);
    session
        .insert(FORM_ID_KEY, &id)
        .map_err(|e| AppError::Session(format!("Failed to store form id: {e}")))?;
    Ok(id)
}

pub fn forget_form_id(session: &Session) {
    session.remove(FORM_ID_KEY);
}
