//! Telegram Bot API

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{ClientError, Result};
use crate::read_body;

/// Body of a `sendMessage` call
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Envelope of every Bot API answer
#[derive(Debug, Deserialize)]
struct BotApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// HTTP client delivering plain-text messages to a single Telegram chat
#[derive(Clone)]
pub struct TelegramClient {
    /// Bot API base URL (e.g., "https://api.telegram.org")
    api_url: String,
    /// Bot token
    token: String,
    /// Recipient chat
    chat_id: String,
    /// HTTP client instance
    client: Client,
}

impl TelegramClient {
    /// Create a new Telegram client
    ///
    /// # Example
    /// ```
    /// use hwstatus_client::TelegramClient;
    ///
    /// let client = TelegramClient::new("https://api.telegram.org/", "123:abc", "42");
    /// assert_eq!(client.api_url(), "https://api.telegram.org");
    /// assert_eq!(client.chat_id(), "42");
    /// ```
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self::with_client(api_url, token, chat_id, Client::new())
    }

    /// Create a new Telegram client with a custom HTTP client
    pub fn with_client(
        api_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        client: Client,
    ) -> Self {
        let api_url = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
            client,
        }
    }

    /// Get the Bot API base URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Get the recipient chat identifier
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Send a plain-text message to the configured chat
    ///
    /// No retry is attempted.
    ///
    /// # Errors
    /// - [`ClientError::InvalidConfig`] if the chat id is empty
    /// - [`ClientError::RequestFailed`] if the Bot API cannot be reached
    /// - [`ClientError::UnexpectedStatus`] for a non-2xx answer
    /// - [`ClientError::Rejected`] if the Bot API answers `ok: false`
    pub async fn send_message(&self, text: &str) -> Result<()> {
        if self.chat_id.is_empty() {
            return Err(ClientError::InvalidConfig("chat id is empty".to_string()));
        }

        let url = format!("{}/bot{}/sendMessage", self.api_url, self.token);
        debug!("Sending message to chat {}", self.chat_id);

        // reqwest errors carry the URL, which contains the bot token
        let response = self
            .client
            .post(&url)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await
            .map_err(|e| ClientError::from(e.without_url()))?;

        let (status, body) = read_body(response)
            .await
            .map_err(|e| ClientError::from(e.without_url()))?;
        let reply = serde_json::from_str::<BotApiReply>(&body).ok();

        if !status.is_success() {
            let reason = reply
                .and_then(|r| r.description)
                .unwrap_or(body);
            error!("Bot API answered {}: {}", status, reason);
            return Err(ClientError::unexpected_status(status.as_u16(), reason));
        }

        match reply {
            Some(BotApiReply { ok: true, .. }) => Ok(()),
            Some(BotApiReply {
                ok: false,
                description,
            }) => Err(ClientError::Rejected(
                description.unwrap_or_else(|| "no description".to_string()),
            )),
            None => Err(ClientError::ParseError(
                "Bot API reply is not a JSON envelope".to_string(),
            )),
        }
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}
