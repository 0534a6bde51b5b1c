//! Status poller
//!
//! Polls the status API, turns the most recent homework into a notification
//! and forwards it to the chat. Identical consecutive notifications are
//! suppressed, for status messages and error messages alike. Every failure
//! ends the cycle; the loop itself never stops.

use hwstatus_core::domain::parse_status;
use hwstatus_core::dto::validate_response;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::scheduler::error::PollError;
use crate::service::{Notifier, StatusSource};

/// Prefix of every error notification
const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// Result of a single poll cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// A new status message was sent
    Delivered(String),

    /// The status message equals the last one sent, nothing was sent
    Unchanged,

    /// The cycle failed
    Failed {
        error: PollError,
        /// Whether an error notification went out for this failure
        notified: bool,
    },
}

impl CycleOutcome {
    /// True for cycles that reached the end of the success path
    pub fn is_success(&self) -> bool {
        !matches!(self, CycleOutcome::Failed { .. })
    }
}

/// Poller tracking the review status of a single submission
pub struct StatusPoller {
    source: Arc<dyn StatusSource>,
    notifier: Arc<dyn Notifier>,
    retry_interval: Duration,
    idle_interval: Duration,
    lookback: Duration,

    /// Start of the next query window, 0 until the first successful cycle
    watermark: i64,
    last_message: Option<String>,
    last_error_message: Option<String>,
}

impl StatusPoller {
    /// Creates a new poller
    pub fn new(
        config: &Config,
        source: Arc<dyn StatusSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            notifier,
            retry_interval: config.retry_interval,
            idle_interval: config.idle_interval,
            lookback: config.lookback,
            watermark: 0,
            last_message: None,
            last_error_message: None,
        }
    }

    /// Current watermark
    pub fn watermark(&self) -> i64 {
        self.watermark
    }

    /// Starts the polling loop
    ///
    /// Never returns; the process is stopped from outside.
    pub async fn run(&mut self) {
        info!(
            "Starting status poller (retry: {:?}, idle: {:?})",
            self.retry_interval, self.idle_interval
        );

        loop {
            let outcome = self.run_cycle().await;
            match &outcome {
                CycleOutcome::Delivered(message) => {
                    info!("Delivered \"{}\", watermark {}", message, self.watermark())
                }
                CycleOutcome::Unchanged => debug!("No change, watermark {}", self.watermark()),
                CycleOutcome::Failed { error, notified } => debug!(
                    "Cycle failed ({}), error notification sent: {}",
                    error.kind(),
                    notified
                ),
            }

            for pause in self.pause_after(&outcome) {
                debug!("Sleeping for {:?}", pause);
                time::sleep(pause).await;
            }
        }
    }

    /// Pauses that follow a cycle
    ///
    /// Every cycle is followed by the retry interval; a successful one also
    /// by the idle interval.
    pub fn pause_after(&self, outcome: &CycleOutcome) -> Vec<Duration> {
        if outcome.is_success() {
            vec![self.retry_interval, self.idle_interval]
        } else {
            vec![self.retry_interval]
        }
    }

    /// Performs a single poll cycle, including the error notification
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let now = chrono::Utc::now().timestamp();

        match self.poll_once(now).await {
            Ok(outcome) => outcome,
            Err(error) => {
                error!(kind = %error.kind(), "Poll cycle failed: {}", error);
                let notified = self.notify_failure(&error).await;
                CycleOutcome::Failed { error, notified }
            }
        }
    }

    /// `from_date` of the next request
    ///
    /// An unset watermark means "now". The lookback window is subtracted and
    /// the result never goes below zero.
    pub fn from_date(&self, now: i64) -> i64 {
        let base = if self.watermark == 0 {
            now
        } else {
            self.watermark
        };
        let lookback = i64::try_from(self.lookback.as_secs()).unwrap_or(i64::MAX);
        base.saturating_sub(lookback).max(0)
    }

    /// Fetch, validate, map and notify
    async fn poll_once(&mut self, now: i64) -> Result<CycleOutcome, PollError> {
        let from_date = self.from_date(now);
        let body = self.source.fetch(from_date).await?;

        let response = validate_response(&body)?;
        let message = parse_status(&response.latest)?;

        let outcome = if self.last_message.as_deref() == Some(message.as_str()) {
            debug!("Status unchanged, nothing to send");
            CycleOutcome::Unchanged
        } else {
            self.send_message(&message)
                .await
                .map_err(PollError::Notify)?;
            self.last_message = Some(message.clone());
            CycleOutcome::Delivered(message)
        };

        debug!(
            "Watermark moved from {} to {}",
            self.watermark, response.current_date
        );
        self.watermark = response.current_date;

        Ok(outcome)
    }

    /// Sends the error notification unless it repeats the previous one
    ///
    /// Returns whether a message went out.
    async fn notify_failure(&mut self, error: &PollError) -> bool {
        let message = format!("{}: {}", FAILURE_PREFIX, error);

        if self.last_error_message.as_deref() == Some(message.as_str()) {
            debug!("Same failure as last time, error notification suppressed");
            return false;
        }

        match self.send_message(&message).await {
            Ok(()) => {
                self.last_error_message = Some(message);
                true
            }
            Err(_) => false,
        }
    }

    /// Sends one message and logs the outcome
    async fn send_message(&self, text: &str) -> hwstatus_client::Result<()> {
        match self.notifier.send(text).await {
            Ok(()) => {
                info!("Сообщение успешно отправлено");
                Ok(())
            }
            Err(e) => {
                error!("Failed to send message: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::error::FailureKind;
    use async_trait::async_trait;
    use hwstatus_client::{ClientError, PracticumClient};
    use serde_json::{Value as JsonValue, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays queued answers, one per fetch
    #[derive(Default)]
    struct ScriptedSource {
        answers: Mutex<VecDeque<Result<JsonValue, ClientError>>>,
        requested: Mutex<Vec<i64>>,
    }

    impl ScriptedSource {
        fn push(&self, answer: Result<JsonValue, ClientError>) {
            self.answers.lock().unwrap().push_back(answer);
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch(&self, from_date: i64) -> Result<JsonValue, ClientError> {
            self.requested.lock().unwrap().push(from_date);
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted answer left")
        }
    }

    /// Records sent messages; fails every send while `failing` is set
    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        failing: Mutex<bool>,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }

        fn set_failing(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> Result<(), ClientError> {
            if *self.failing.lock().unwrap() {
                return Err(ClientError::Rejected("chat not found".to_string()));
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn poller() -> (StatusPoller, Arc<ScriptedSource>, Arc<RecordingNotifier>) {
        let config = Config::new("p".into(), "t".into(), "42".into());
        let source = Arc::new(ScriptedSource::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let poller = StatusPoller::new(&config, source.clone(), notifier.clone());
        (poller, source, notifier)
    }

    fn answer(status: &str, current_date: i64) -> Result<JsonValue, ClientError> {
        Ok(json!({
            "homeworks": [{"homework_name": "task1", "status": status}],
            "current_date": current_date
        }))
    }

    const APPROVED: &str = "Изменился статус проверки работы \"task1\". Работа проверена: ревьюеру всё понравилось. Ура!";

    #[tokio::test]
    async fn test_approved_homework_is_delivered() {
        let (mut poller, source, notifier) = poller();
        source.push(answer("approved", 1000));

        let outcome = poller.run_cycle().await;

        assert!(matches!(outcome, CycleOutcome::Delivered(ref m) if m == APPROVED));
        assert_eq!(notifier.sent(), vec![APPROVED.to_string()]);
        assert_eq!(poller.watermark(), 1000);
    }

    #[tokio::test]
    async fn test_identical_status_is_sent_once() {
        let (mut poller, source, notifier) = poller();
        source.push(answer("approved", 1000));
        source.push(answer("approved", 2000));

        poller.run_cycle().await;
        let second = poller.run_cycle().await;

        assert!(matches!(second, CycleOutcome::Unchanged));
        assert!(second.is_success());
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(poller.watermark(), 2000);
        assert_eq!(*source.requested.lock().unwrap().last().unwrap(), 1000);
    }

    #[tokio::test]
    async fn test_changed_status_is_sent_again() {
        let (mut poller, source, notifier) = poller();
        source.push(answer("reviewing", 1000));
        source.push(answer("rejected", 2000));

        poller.run_cycle().await;
        poller.run_cycle().await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].ends_with("Работа взята на проверку ревьюером."));
        assert!(sent[1].ends_with("Работа проверена: у ревьюера есть замечания."));
    }

    #[tokio::test]
    async fn test_server_error_sends_one_error_notification() {
        let (mut poller, source, notifier) = poller();
        source.push(Err(ClientError::unexpected_status(500, "boom")));

        let outcome = poller.run_cycle().await;

        match &outcome {
            CycleOutcome::Failed { error, notified } => {
                assert_eq!(error.kind(), FailureKind::Transport);
                assert!(*notified);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("Сбой в работе программы: "));
        assert!(sent[0].contains("500"));
        assert_eq!(poller.watermark(), 0);
        assert_eq!(
            poller.pause_after(&outcome),
            vec![Duration::from_secs(600)]
        );
    }

    #[tokio::test]
    async fn test_repeated_error_is_sent_once_until_it_changes() {
        let (mut poller, source, notifier) = poller();
        source.push(Err(ClientError::unexpected_status(500, "boom")));
        source.push(Err(ClientError::unexpected_status(500, "boom")));
        source.push(Err(ClientError::unexpected_status(502, "bad gateway")));

        poller.run_cycle().await;
        let second = poller.run_cycle().await;
        poller.run_cycle().await;

        assert!(matches!(second, CycleOutcome::Failed { notified: false, .. }));
        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].contains("502"));
    }

    #[tokio::test]
    async fn test_empty_homework_list_is_a_failure() {
        let (mut poller, source, notifier) = poller();
        source.push(Ok(json!({"homeworks": [], "current_date": 1000})));

        let outcome = poller.run_cycle().await;

        assert!(matches!(
            outcome,
            CycleOutcome::Failed { ref error, notified: true } if error.kind() == FailureKind::Content
        ));
        assert_eq!(
            notifier.sent(),
            vec!["Сбой в работе программы: Список работ пуст".to_string()]
        );
        assert_eq!(poller.watermark(), 0);
    }

    #[tokio::test]
    async fn test_unknown_status_and_bad_shape_are_failures() {
        let (mut poller, source, notifier) = poller();
        source.push(answer("lost", 1000));
        source.push(Ok(json!({"homeworks": "task1", "current_date": 1000})));
        source.push(Err(ClientError::ParseError("expected value".into())));

        let kinds = [
            poller.run_cycle().await,
            poller.run_cycle().await,
            poller.run_cycle().await,
        ]
        .iter()
        .map(|outcome| match outcome {
            CycleOutcome::Failed { error, .. } => error.kind(),
            other => panic!("unexpected outcome: {other:?}"),
        })
        .collect::<Vec<_>>();

        assert_eq!(
            kinds,
            vec![FailureKind::Content, FailureKind::Shape, FailureKind::Decode]
        );
        assert_eq!(notifier.sent().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_watermark_and_retries_message() {
        let (mut poller, source, notifier) = poller();
        source.push(answer("approved", 1000));
        source.push(answer("approved", 1000));

        notifier.set_failing(true);
        let first = poller.run_cycle().await;
        assert!(matches!(
            first,
            CycleOutcome::Failed { ref error, notified: false } if error.kind() == FailureKind::Notify
        ));
        assert_eq!(poller.watermark(), 0);

        notifier.set_failing(false);
        let second = poller.run_cycle().await;
        assert!(matches!(second, CycleOutcome::Delivered(_)));
        assert_eq!(notifier.sent(), vec![APPROVED.to_string()]);
        assert_eq!(poller.watermark(), 1000);
    }

    #[tokio::test]
    async fn test_unsent_error_is_not_remembered() {
        let (mut poller, source, notifier) = poller();
        source.push(Err(ClientError::unexpected_status(500, "boom")));
        source.push(Err(ClientError::unexpected_status(500, "boom")));

        notifier.set_failing(true);
        poller.run_cycle().await;
        notifier.set_failing(false);
        let second = poller.run_cycle().await;

        assert!(matches!(second, CycleOutcome::Failed { notified: true, .. }));
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_earlier_record_does_not_fail_cycle() {
        let (mut poller, source, notifier) = poller();
        source.push(Ok(json!({
            "homeworks": [
                {"homework_name": "task1", "status": "approved"},
                {"homework_name": 17, "status": "rejected"}
            ],
            "current_date": 1000
        })));

        let outcome = poller.run_cycle().await;

        assert!(matches!(outcome, CycleOutcome::Delivered(ref m) if m == APPROVED));
        assert_eq!(notifier.sent(), vec![APPROVED.to_string()]);
        assert_eq!(poller.watermark(), 1000);
    }

    #[tokio::test]
    async fn test_server_errors_with_different_bodies_are_sent_once() {
        let (mut poller, source, notifier) = poller();
        source.push(Err(ClientError::unexpected_status(500, "request id 1f3a")));
        source.push(Err(ClientError::unexpected_status(500, "request id 9b7c")));

        poller.run_cycle().await;
        let second = poller.run_cycle().await;

        assert!(matches!(second, CycleOutcome::Failed { notified: false, .. }));
        assert_eq!(
            notifier.sent(),
            vec!["Сбой в работе программы: Код ответа API не равен 200 (получен 500)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_reported_once() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = Config::new("p".into(), "t".into(), "42".into());
        let client = PracticumClient::new(format!("http://{}/statuses/", addr), "p");
        let notifier = Arc::new(RecordingNotifier::default());
        let mut poller = StatusPoller::new(&config, Arc::new(client), notifier.clone());

        // Different from_date on each request
        poller.watermark = 1000;
        let first = poller.run_cycle().await;
        poller.watermark = 2000;
        let second = poller.run_cycle().await;

        assert!(matches!(
            first,
            CycleOutcome::Failed { ref error, notified: true } if error.kind() == FailureKind::Transport
        ));
        assert!(matches!(second, CycleOutcome::Failed { notified: false, .. }));
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(!sent[0].contains("from_date"));
    }

    #[test]
    fn test_pause_after_success_adds_idle_interval() {
        let (poller, _, _) = poller();
        assert_eq!(
            poller.pause_after(&CycleOutcome::Unchanged),
            vec![Duration::from_secs(600), Duration::from_secs(1000)]
        );
    }

    #[test]
    fn test_from_date() {
        let config = Config {
            lookback: Duration::from_secs(7 * 24 * 60 * 60),
            ..Config::new("p".into(), "t".into(), "42".into())
        };
        let mut poller = StatusPoller::new(
            &config,
            Arc::new(ScriptedSource::default()),
            Arc::new(RecordingNotifier::default()),
        );

        // Unset watermark means now
        assert_eq!(poller.from_date(1_700_000_000), 1_700_000_000 - 604_800);

        poller.watermark = 1_000_000;
        assert_eq!(poller.from_date(1_700_000_000), 1_000_000 - 604_800);

        poller.watermark = 1000;
        assert_eq!(poller.from_date(1_700_000_000), 0);
    }
}
