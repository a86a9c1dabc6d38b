use std::time::Duration;

use crate::errors::AppError;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_HOTEL_API_URL: &str = "http://localhost:8000/api/hotels";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_IMAGE_MAX_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_FORM_IDLE_SECS: u64 = 30 * 60;
pub const DEFAULT_MAX_OPEN_FORMS: usize = 1_000;

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub hotel_api_url: String,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    pub image_max_bytes: usize,
    pub session_key: Option<String>,
    /// Open forms untouched for this long are closed.
    pub form_idle_ttl: Duration,
    pub max_open_forms: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            hotel_api_url: DEFAULT_HOTEL_API_URL.to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            image_max_bytes: DEFAULT_IMAGE_MAX_BYTES,
            session_key: None,
            form_idle_ttl: Duration::from_secs(DEFAULT_FORM_IDLE_SECS),
            max_open_forms: DEFAULT_MAX_OPEN_FORMS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let request_timeout = match get("HOTEL_API_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_setting("HOTEL_API_TIMEOUT_SECS", &raw)?),
            None => defaults.request_timeout,
        };
        let image_max_bytes = match get("IMAGE_MAX_BYTES") {
            Some(raw) => parse_setting("IMAGE_MAX_BYTES", &raw)?,
            None => defaults.image_max_bytes,
        };
        let form_idle_ttl = match get("FORM_IDLE_SECS") {
            Some(raw) => Duration::from_secs(parse_setting("FORM_IDLE_SECS", &raw)?),
            None => defaults.form_idle_ttl,
        };
        let max_open_forms = match get("MAX_OPEN_FORMS") {
            Some(raw) => parse_setting("MAX_OPEN_FORMS", &raw)?,
            None => defaults.max_open_forms,
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            hotel_api_url: get("HOTEL_API_URL").unwrap_or(defaults.hotel_api_url),
            api_token: get("HOTEL_API_TOKEN"),
            request_timeout,
            image_max_bytes,
            session_key: get("SESSION_KEY"),
            form_idle_ttl,
            max_open_forms,
        })
    }
}

fn parse_setting<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{key} must be a positive integer, got '{raw}'")))
}
