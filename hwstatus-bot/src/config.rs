//! Bot configuration
//!
//! Defines the credentials, remote endpoints, polling intervals and log
//! destination of the bot. Everything is read once at startup and handed to
//! the poller; nothing is re-read while running.

use std::path::PathBuf;
use std::time::Duration;
use tracing::error;

/// Default homework status endpoint
pub const DEFAULT_PRACTICUM_ENDPOINT: &str =
    "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Default Telegram Bot API base URL
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Bot configuration
#[derive(Clone)]
pub struct Config {
    /// OAuth token for the status API
    pub practicum_token: String,

    /// Telegram bot token
    pub telegram_token: String,

    /// Chat that receives every notification
    pub telegram_chat_id: String,

    /// Status API endpoint
    pub practicum_endpoint: String,

    /// Telegram Bot API base URL
    pub telegram_api_url: String,

    /// Pause after every cycle
    pub retry_interval: Duration,

    /// Extra pause after a successful cycle
    pub idle_interval: Duration,

    /// Subtracted from the watermark before each request
    pub lookback: Duration,

    /// Timeout for a single HTTP request, unbounded when `None`
    pub http_timeout: Option<Duration>,

    /// Log file, appended to
    pub log_file: PathBuf,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(
        practicum_token: String,
        telegram_token: String,
        telegram_chat_id: String,
    ) -> Self {
        Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            practicum_endpoint: DEFAULT_PRACTICUM_ENDPOINT.to_string(),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            retry_interval: Duration::from_secs(600),
            idle_interval: Duration::from_secs(1000),
            lookback: Duration::ZERO,
            http_timeout: None,
            log_file: PathBuf::from("logger.log"),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - PRACTICUM_TOKEN, TELEGRAM_TOKEN, TELEGRAM_CHAT_ID (required, see
    ///   [`Config::check_tokens`])
    /// - PRACTICUM_ENDPOINT (optional)
    /// - TELEGRAM_API_URL (optional)
    /// - RETRY_TIME (optional, seconds, default: 600)
    /// - IDLE_TIME (optional, seconds, default: 1000)
    /// - PRACTICUM_LOOKBACK_DAYS (optional, default: 0)
    /// - HTTP_TIMEOUT_SECS (optional, default: no timeout)
    /// - LOG_FILE (optional, default: logger.log)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    ///
    /// Missing tokens become empty strings; unparsable numbers fall back to
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let token = |key: &str| lookup(key).unwrap_or_default();
        let seconds = |key: &str| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
        };

        let mut config = Self::new(
            token("PRACTICUM_TOKEN"),
            token("TELEGRAM_TOKEN"),
            token("TELEGRAM_CHAT_ID"),
        );

        if let Some(endpoint) = lookup("PRACTICUM_ENDPOINT") {
            config.practicum_endpoint = endpoint;
        }
        if let Some(api_url) = lookup("TELEGRAM_API_URL") {
            config.telegram_api_url = api_url;
        }
        if let Some(retry) = seconds("RETRY_TIME") {
            config.retry_interval = retry;
        }
        if let Some(idle) = seconds("IDLE_TIME") {
            config.idle_interval = idle;
        }
        if let Some(days) =
            lookup("PRACTICUM_LOOKBACK_DAYS").and_then(|s| s.trim().parse::<u64>().ok())
        {
            config.lookback = Duration::from_secs(days * 24 * 60 * 60);
        }
        config.http_timeout = seconds("HTTP_TIMEOUT_SECS");
        if let Some(log_file) = lookup("LOG_FILE") {
            config.log_file = PathBuf::from(log_file);
        }

        config
    }

    /// Names of the required variables that are missing or empty
    pub fn missing_tokens(&self) -> Vec<&'static str> {
        [
            ("PRACTICUM_TOKEN", &self.practicum_token),
            ("TELEGRAM_TOKEN", &self.telegram_token),
            ("TELEGRAM_CHAT_ID", &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Checks that every required credential is present
    ///
    /// Logs one error per missing variable.
    pub fn check_tokens(&self) -> bool {
        let missing = self.missing_tokens();
        for name in &missing {
            error!(
                "Отсутствует обязательная переменная окружения: \"{}\"",
                name
            );
        }
        missing.is_empty()
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [
            ("practicum_endpoint", &self.practicum_endpoint),
            ("telegram_api_url", &self.telegram_api_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.retry_interval.is_zero() {
            anyhow::bail!("retry_interval must be greater than 0");
        }

        if matches!(self.http_timeout, Some(timeout) if timeout.is_zero()) {
            anyhow::bail!("http_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("practicum_endpoint", &self.practicum_endpoint)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("retry_interval", &self.retry_interval)
            .field("idle_interval", &self.idle_interval)
            .field("lookback", &self.lookback)
            .field("http_timeout", &self.http_timeout)
            .field("log_file", &self.log_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::new("p".into(), "t".into(), "42".into());
        assert_eq!(config.retry_interval, Duration::from_secs(600));
        assert_eq!(config.idle_interval, Duration::from_secs(1000));
        assert_eq!(config.lookback, Duration::ZERO);
        assert_eq!(config.http_timeout, None);
        assert_eq!(config.log_file, PathBuf::from("logger.log"));
        assert!(config.validate().is_ok());
        assert!(config.check_tokens());
    }

    #[test]
    fn test_from_lookup_reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PRACTICUM_TOKEN", "p"),
            ("TELEGRAM_TOKEN", "t"),
            ("TELEGRAM_CHAT_ID", "42"),
            ("PRACTICUM_ENDPOINT", "http://localhost:9000/statuses/"),
            ("RETRY_TIME", "30"),
            ("IDLE_TIME", "0"),
            ("PRACTICUM_LOOKBACK_DAYS", "7"),
            ("HTTP_TIMEOUT_SECS", "10"),
            ("LOG_FILE", "/tmp/hwstatus.log"),
        ]));

        assert_eq!(config.practicum_endpoint, "http://localhost:9000/statuses/");
        assert_eq!(config.telegram_api_url, DEFAULT_TELEGRAM_API_URL);
        assert_eq!(config.retry_interval, Duration::from_secs(30));
        assert_eq!(config.idle_interval, Duration::ZERO);
        assert_eq!(config.lookback, Duration::from_secs(7 * 24 * 60 * 60));
        assert_eq!(config.http_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.log_file, PathBuf::from("/tmp/hwstatus.log"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_ignores_bad_numbers() {
        let config = Config::from_lookup(lookup(&[("RETRY_TIME", "soon")]));
        assert_eq!(config.retry_interval, Duration::from_secs(600));
    }

    #[test]
    fn test_missing_tokens() {
        let config = Config::from_lookup(lookup(&[
            ("TELEGRAM_TOKEN", "t"),
            ("TELEGRAM_CHAT_ID", " "),
        ]));
        assert_eq!(
            config.missing_tokens(),
            vec!["PRACTICUM_TOKEN", "TELEGRAM_CHAT_ID"]
        );
        assert!(!config.check_tokens());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::new("p".into(), "t".into(), "42".into());

        config.practicum_endpoint = "not-a-url".to_string();
        assert!(config.validate().is_err());
        config.practicum_endpoint = DEFAULT_PRACTICUM_ENDPOINT.to_string();

        config.retry_interval = Duration::ZERO;
        assert!(config.validate().is_err());
        config.retry_interval = Duration::from_secs(1);

        config.http_timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());
        config.http_timeout = None;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let config = Config::new("practicum-secret".into(), "telegram-secret".into(), "42".into());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("practicum-secret"));
        assert!(!debug.contains("telegram-secret"));
    }
}
