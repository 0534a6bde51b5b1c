//! Hwstatus HTTP Clients
//!
//! Thin, typed HTTP clients for the two remote services the bot talks to:
//! - [`PracticumClient`]: the homework review status API
//! - [`TelegramClient`]: the Telegram Bot API, used to deliver notifications
//!
//! # Example
//!
//! ```no_run
//! use hwstatus_client::{PracticumClient, TelegramClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let practicum = PracticumClient::new(
//!         "https://practicum.yandex.ru/api/user_api/homework_statuses/",
//!         "practicum-token",
//!     );
//!     let body = practicum.homework_statuses(0).await?;
//!
//!     let telegram = TelegramClient::new("https://api.telegram.org", "bot-token", "12345");
//!     telegram.send_message(&body.to_string()).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
mod practicum;
mod telegram;

pub use error::{ClientError, Result};
pub use practicum::PracticumClient;
pub use telegram::TelegramClient;

use reqwest::Client;
use std::time::Duration;

/// Builds the shared HTTP client
///
/// Without a timeout a hanging request blocks the caller indefinitely.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// let client = hwstatus_client::http_client(Some(Duration::from_secs(30))).unwrap();
/// ```
pub fn http_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Reads the status and the whole body of a response
async fn read_body(
    response: reqwest::Response,
) -> reqwest::Result<(reqwest::StatusCode, String)> {
    let status = response.status();
    let text = response.text().await?;
    Ok((status, text))
}
