use thiserror::Error;

/// Client-level error type.
/// Every failure ends up as UI state through `user_message`; nothing here is fatal.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

pub const RETRY_MESSAGE: &str = "Something went wrong while loading data. Please try again.";

impl ClientError {
    /// Network failures and server-side errors can succeed on a second attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) => true,
            ClientError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Text shown inline where the failure happened.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::NotFound(what) => format!("{what} could not be found."),
            ClientError::Unauthorized => "Please sign in to continue.".to_string(),
            ClientError::Api { status, message } if *status < 500 && !message.is_empty() => {
                message.clone()
            }
            ClientError::Config(msg) => {
                tracing::error!("Configuration error: {msg}");
                RETRY_MESSAGE.to_string()
            }
            _ => RETRY_MESSAGE.to_string(),
        }
    }

    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ClientError::Unauthorized,
            404 => ClientError::NotFound(if message.is_empty() {
                "Resource".to_string()
            } else {
                message
            }),
            _ => ClientError::Api { status, message },
        }
    }
}
