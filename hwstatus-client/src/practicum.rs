//! Homework review status API

use reqwest::{Client, StatusCode, header::AUTHORIZATION};
use serde_json::Value as JsonValue;
use tracing::{debug, error, info};

use crate::error::{ClientError, Result};
use crate::read_body;

/// HTTP client for the homework review status API
///
/// Every request carries a static `Authorization: OAuth <token>` header.
#[derive(Clone)]
pub struct PracticumClient {
    /// Full URL of the `homework_statuses` endpoint
    endpoint: String,
    /// OAuth token of the student
    token: String,
    /// HTTP client instance
    client: Client,
}

impl PracticumClient {
    /// Create a new status API client
    ///
    /// # Example
    /// ```
    /// use hwstatus_client::PracticumClient;
    ///
    /// let client = PracticumClient::new("https://practicum.yandex.ru/api/user_api/homework_statuses/", "token");
    /// assert!(client.endpoint().ends_with("homework_statuses/"));
    /// ```
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(endpoint, token, Client::new())
    }

    /// Create a new status API client with a custom HTTP client
    pub fn with_client(endpoint: impl Into<String>, token: impl Into<String>, client: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
        }
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch homework status changes since `from_date`
    ///
    /// # Arguments
    /// * `from_date` - Unix timestamp (seconds), start of the query window
    ///
    /// # Returns
    /// The decoded JSON body. Its shape is not checked here.
    ///
    /// # Errors
    /// - [`ClientError::RequestFailed`] if the endpoint cannot be reached
    /// - [`ClientError::UnexpectedStatus`] for anything but `200 OK`
    /// - [`ClientError::ParseError`] if the body is not JSON
    pub async fn homework_statuses(&self, from_date: i64) -> Result<JsonValue> {
        debug!("Requesting homework statuses from_date={}", from_date);

        // Error text must not depend on `from_date`; the URL stays in the log
        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                error!("Status API endpoint is unreachable: {}", e);
                ClientError::from(e.without_url())
            })?;

        let (status, body) = read_body(response).await.map_err(|e| {
            error!("Failed to read status API answer: {}", e);
            ClientError::from(e.without_url())
        })?;

        if status != StatusCode::OK {
            error!("Status API answered {}: {}", status, body);
            return Err(ClientError::unexpected_status(status.as_u16(), body));
        }

        let json = serde_json::from_str(&body).map_err(|e| {
            error!("Status API returned malformed JSON: {}", e);
            ClientError::ParseError(e.to_string())
        })?;

        info!("Status API request succeeded");
        Ok(json)
    }
}

impl std::fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticumClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish()
    }
}
