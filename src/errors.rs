use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use std::fmt;

/// Errors raised by the web host around the form.
#[derive(Debug)]
pub enum AppError {
    Template(askama::Error),
    Session(String),
    State(String),
    Form(FormError),
    Config(String),
    BadRequest(String),
    Csrf,
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::State(e) => write!(f, "State error: {e}"),
            AppError::Form(e) => write!(f, "Form error: {e}"),
            AppError::Config(e) => write!(f, "Configuration error: {e}"),
            AppError::BadRequest(e) => write!(f, "Bad request: {e}"),
            AppError::Csrf => write!(f, "Invalid or missing CSRF token"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound().body("Not Found"),
            AppError::Csrf => HttpResponse::Forbidden().body("Invalid or missing CSRF token"),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().body(msg.clone()),
            AppError::Form(e) => HttpResponse::BadRequest().body(e.to_string()),
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError().body("Internal Server Error")
            }
        }
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

impl From<FormError> for AppError {
    fn from(e: FormError) -> Self {
        AppError::Form(e)
    }
}

/// Render an askama template into an HTML response.
pub fn render(tmpl: impl Template) -> Result<HttpResponse, AppError> {
    let body = tmpl.render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// Misuse of the form model: a key the schema doesn't know, or a value of the wrong shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    UnknownField(String),
    KindMismatch { key: String, expected: &'static str },
    InvalidNumber { key: String, raw: String },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::UnknownField(key) => write!(f, "Unknown field '{key}'"),
            FormError::KindMismatch { key, expected } => {
                write!(f, "Field '{key}' expects a {expected} value")
            }
            FormError::InvalidNumber { key, raw } => {
                write!(f, "Field '{key}' holds '{raw}', which is not a number")
            }
        }
    }
}

impl std::error::Error for FormError {}
