//! Service layer
//!
//! The poller talks to the outside world through two seams: a source of
//! status API bodies and a notifier delivering text messages. Both are
//! traits so the poller can be driven by fakes in tests.

use async_trait::async_trait;
use hwstatus_client::{ClientError, PracticumClient, TelegramClient};
use serde_json::Value as JsonValue;

/// Source of raw homework status answers
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetches the status changes since `from_date` (Unix seconds)
    async fn fetch(&self, from_date: i64) -> Result<JsonValue, ClientError>;
}

/// Delivery of notifications to the single recipient
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one plain-text message
    async fn send(&self, text: &str) -> Result<(), ClientError>;
}

#[async_trait]
impl StatusSource for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<JsonValue, ClientError> {
        self.homework_statuses(from_date).await
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, text: &str) -> Result<(), ClientError> {
        self.send_message(text).await
    }
}
