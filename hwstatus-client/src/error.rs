//! Error types for the hwstatus clients

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Longest response body kept in an error, in characters
const MAX_BODY_CHARS: usize = 200;

/// Errors that can occur when talking to the review API or to Telegram
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response was received
    #[error("Эндпоинт недоступен: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Remote side answered with an unexpected status code
    ///
    /// The body is kept for logging only; error pages often carry request
    /// ids, so it stays out of the display text.
    #[error("Код ответа API не равен 200 (получен {status})")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Start of the response body
        body: String,
    },

    /// Response body is not valid JSON
    #[error("Ошибка преобразования JSON: {0}")]
    ParseError(String),

    /// Telegram answered `ok: false`
    #[error("Telegram отклонил сообщение: {0}")]
    Rejected(String),

    /// Client was configured with unusable values
    #[error("Некорректная конфигурация клиента: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Create a status error, keeping only the start of a long body
    pub fn unexpected_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let body = match body.char_indices().nth(MAX_BODY_CHARS) {
            Some((cut, _)) => format!("{}…", &body[..cut]),
            None => body,
        };
        Self::UnexpectedStatus { status, body }
    }

    /// Check if the failure happened on the wire (no answer or a bad status)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed(_) | Self::UnexpectedStatus { .. }
        )
    }

    /// Check if the body could not be decoded
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::ParseError(_))
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { status, .. } if *status >= 500)
    }
}
