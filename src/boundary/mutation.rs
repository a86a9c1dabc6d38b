use async_trait::async_trait;
use std::fmt;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::form::SubmissionPayload;

/// Why the backend didn't create the hotel. The form treats every variant the same way;
/// the distinction only matters for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    Transport(String),
    Timeout,
    Rejected { status: u16, reason: String },
}

impl MutationError {
    /// Server-side and network trouble may clear up on resubmit; a 4xx rejection won't.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MutationError::Transport(_) | MutationError::Timeout => true,
            MutationError::Rejected { status, .. } => *status >= 500,
        }
    }
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationError::Transport(e) => write!(f, "Transport error: {e}"),
            MutationError::Timeout => write!(f, "Request timed out"),
            MutationError::Rejected { status, reason } => {
                write!(f, "Rejected with status {status}: {reason}")
            }
        }
    }
}

impl std::error::Error for MutationError {}

impl From<reqwest::Error> for MutationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MutationError::Timeout
        } else {
            MutationError::Transport(e.to_string())
        }
    }
}

/// The create-hotel operation on the backend.
#[async_trait]
pub trait CreateHotel: Send + Sync {
    async fn create_hotel(&self, payload: SubmissionPayload) -> Result<(), MutationError>;
}

/// Posts the payload as multipart form data to the hotels endpoint.
pub struct HttpCreateHotel {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpCreateHotel {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.hotel_api_url.clone(),
            token: config.api_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CreateHotel for HttpCreateHotel {
    async fn create_hotel(&self, payload: SubmissionPayload) -> Result<(), MutationError> {
        let form = payload.into_multipart()?;

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Backends usually answer `{"message": "..."}`; fall back to the raw body.
        let body = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or(body);

        Err(MutationError::Rejected {
            status: status.as_u16(),
            reason,
        })
    }
}
