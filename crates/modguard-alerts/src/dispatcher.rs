//! Alert dispatcher
//!
//! Fans one alert out to every configured channel. Channels run as
//! independent tasks with their own timeout, so a failing, hanging or
//! panicking channel never blocks or aborts the others, and never
//! propagates to the caller.

use crate::channel::{Alert, AlertChannel, ChannelError};
use crate::email::{BrevoEmailChannel, BREVO_ENDPOINT};
use crate::slack::SlackWebhookChannel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Notification log status when dispatch ran
pub const STATUS_SUCCESS: &str = "success";

/// Notification log status when no channel is configured
pub const STATUS_SKIPPED: &str = "skipped";

/// Channel label when no channel is configured
pub const NO_CHANNELS_LABEL: &str = "none";

/// Alert channel credentials and tunables.
///
/// Every credential is optional; an absent credential disables its channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Incoming-webhook URL for chat alerts
    #[serde(default)]
    pub slack_webhook_url: Option<String>,

    /// Transactional e-mail API key
    #[serde(default)]
    pub brevo_api_key: Option<String>,

    /// Sender address for e-mail alerts
    #[serde(default)]
    pub brevo_sender: Option<String>,

    /// E-mail provider endpoint
    #[serde(default = "default_email_endpoint")]
    pub email_endpoint: String,

    /// Fixed e-mail recipient; defaults to the submitting user
    #[serde(default)]
    pub recipient: Option<String>,

    /// Per-channel timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl AlertsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            slack_webhook_url: None,
            brevo_api_key: None,
            brevo_sender: None,
            email_endpoint: default_email_endpoint(),
            recipient: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_email_endpoint() -> String {
    BREVO_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

/// What happened on one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
    /// The provider accepted the submission
    Delivered,
    /// The submission failed; the reason is kept for logs
    Failed(String),
}

impl ChannelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Failed(_) => "failed",
        }
    }
}

/// Outcome for one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReport {
    pub channel: String,
    pub status: ChannelStatus,
}

/// Aggregate outcome of one dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub reports: Vec<ChannelReport>,
}

impl DispatchOutcome {
    /// Composite channel label, e.g. `email and slack`
    pub fn label(&self) -> String {
        if self.reports.is_empty() {
            return NO_CHANNELS_LABEL.to_string();
        }
        self.reports
            .iter()
            .map(|r| r.channel.as_str())
            .collect::<Vec<_>>()
            .join(" and ")
    }

    /// Aggregate status for the notification log.
    ///
    /// `success` whenever at least one channel was attempted, regardless of
    /// individual delivery.
    pub fn status(&self) -> &'static str {
        if self.reports.is_empty() {
            STATUS_SKIPPED
        } else {
            STATUS_SUCCESS
        }
    }

    /// Number of channels whose submission failed
    pub fn failures(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, ChannelStatus::Failed(_)))
            .count()
    }
}

/// Best-effort fan-out over independent alert channels
#[derive(Clone, Default)]
pub struct AlertDispatcher {
    channels: Vec<Arc<dyn AlertChannel>>,
    timeout: Duration,
}

impl AlertDispatcher {
    /// Create a dispatcher over explicit channels
    pub fn new(channels: Vec<Arc<dyn AlertChannel>>, timeout: Duration) -> Self {
        Self { channels, timeout }
    }

    /// Build the channels whose credentials are present
    pub fn from_config(config: &AlertsConfig, http: reqwest::Client) -> Self {
        let timeout = config.timeout();
        // E-mail first: audit rows read `email and slack`.
        let mut channels: Vec<Arc<dyn AlertChannel>> = Vec::new();

        match (config.brevo_api_key.as_deref(), config.brevo_sender.as_deref()) {
            (Some(key), Some(sender)) if !key.is_empty() && !sender.is_empty() => {
                channels.push(Arc::new(
                    BrevoEmailChannel::new(key, sender, http.clone(), timeout)
                        .with_endpoint(&config.email_endpoint)
                        .with_recipient(config.recipient.clone()),
                ));
            }
            (Some(key), _) if !key.is_empty() => {
                warn!("E-mail API key set without a sender address, e-mail alerts disabled");
            }
            _ => info!("E-mail API key not configured, e-mail alerts disabled"),
        }

        match config.slack_webhook_url.as_deref() {
            Some(url) if !url.is_empty() => {
                channels.push(Arc::new(SlackWebhookChannel::new(url, http, timeout)));
            }
            _ => info!("Slack webhook not configured, chat alerts disabled"),
        }

        Self::new(channels, timeout)
    }

    /// Names of the enabled channels
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    pub fn has_channels(&self) -> bool {
        !self.channels.is_empty()
    }

    /// Send the alert to every enabled channel and report per-channel
    /// outcomes. Never fails.
    pub async fn dispatch(&self, alert: Alert) -> DispatchOutcome {
        let alert = Arc::new(alert);
        let timeout = self.timeout;

        let handles: Vec<_> = self
            .channels
            .iter()
            .map(|channel| {
                let channel = Arc::clone(channel);
                let alert = Arc::clone(&alert);
                tokio::spawn(async move {
                    match tokio::time::timeout(timeout, channel.send(&alert)).await {
                        Ok(result) => result,
                        Err(_) => Err(ChannelError::Timeout {
                            channel: channel.name().to_string(),
                        }),
                    }
                })
            })
            .collect();

        let results = futures::future::join_all(handles).await;

        let reports = self
            .channels
            .iter()
            .zip(results)
            .map(|(channel, joined)| {
                let name = channel.name().to_string();
                let result = joined.unwrap_or_else(|_| {
                    Err(ChannelError::Panicked {
                        channel: name.clone(),
                    })
                });
                let status = match result {
                    Ok(()) => ChannelStatus::Delivered,
                    Err(e) => {
                        warn!(channel = %name, error = %e, "Alert channel failed");
                        ChannelStatus::Failed(e.to_string())
                    }
                };
                metrics::counter!(
                    "modguard_alerts_total",
                    "channel" => name.clone(),
                    "outcome" => status.as_str()
                )
                .increment(1);
                ChannelReport {
                    channel: name,
                    status,
                }
            })
            .collect();

        DispatchOutcome { reports }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use modguard_core::ContentKind;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct RecordingChannel {
        name: &'static str,
        calls: AtomicU32,
    }

    impl RecordingChannel {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl AlertChannel for RecordingChannel {
        async fn send(&self, _alert: &Alert) -> Result<(), ChannelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    struct FailingChannel;

    #[async_trait]
    impl AlertChannel for FailingChannel {
        async fn send(&self, _alert: &Alert) -> Result<(), ChannelError> {
            Err(ChannelError::Status {
                channel: "slack".to_string(),
                status: 500,
            })
        }

        fn name(&self) -> &str {
            "slack"
        }
    }

    struct HangingChannel;

    #[async_trait]
    impl AlertChannel for HangingChannel {
        async fn send(&self, _alert: &Alert) -> Result<(), ChannelError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }

        fn name(&self) -> &str {
            "slack"
        }
    }

    struct PanickingChannel;

    #[async_trait]
    impl AlertChannel for PanickingChannel {
        async fn send(&self, _alert: &Alert) -> Result<(), ChannelError> {
            panic!("provider client bug");
        }

        fn name(&self) -> &str {
            "slack"
        }
    }

    fn alert() -> Alert {
        Alert::new("user@example.com", ContentKind::Text, "f00d", "threatening language")
    }

    #[tokio::test]
    async fn test_all_channels_attempted() {
        let email = RecordingChannel::new("email");
        let slack = RecordingChannel::new("slack");
        let dispatcher = AlertDispatcher::new(
            vec![email.clone() as Arc<dyn AlertChannel>, slack.clone()],
            Duration::from_secs(1),
        );

        let outcome = dispatcher.dispatch(alert()).await;

        assert_eq!(slack.calls.load(Ordering::SeqCst), 1);
        assert_eq!(email.calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.label(), "email and slack");
        assert_eq!(outcome.status(), STATUS_SUCCESS);
        assert_eq!(outcome.failures(), 0);
    }

    #[tokio::test]
    async fn test_failure_does_not_block_other_channel() {
        let email = RecordingChannel::new("email");
        let dispatcher = AlertDispatcher::new(
            vec![Arc::new(FailingChannel) as Arc<dyn AlertChannel>, email.clone()],
            Duration::from_secs(1),
        );

        let outcome = dispatcher.dispatch(alert()).await;

        assert_eq!(email.calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.failures(), 1);
        assert_eq!(outcome.status(), STATUS_SUCCESS);
        assert_eq!(outcome.reports[1].status, ChannelStatus::Delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_channel_is_cut_off() {
        let email = RecordingChannel::new("email");
        let dispatcher = AlertDispatcher::new(
            vec![Arc::new(HangingChannel) as Arc<dyn AlertChannel>, email.clone()],
            Duration::from_secs(5),
        );

        let outcome = dispatcher.dispatch(alert()).await;

        assert_eq!(email.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(outcome.reports[0].status, ChannelStatus::Failed(ref m) if m.contains("timed out")));
    }

    #[tokio::test]
    async fn test_panicking_channel_is_isolated() {
        let email = RecordingChannel::new("email");
        let dispatcher = AlertDispatcher::new(
            vec![Arc::new(PanickingChannel) as Arc<dyn AlertChannel>, email.clone()],
            Duration::from_secs(1),
        );

        let outcome = dispatcher.dispatch(alert()).await;

        assert_eq!(email.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(outcome.reports[0].status, ChannelStatus::Failed(ref m) if m.contains("panicked")));
    }

    #[tokio::test]
    async fn test_no_channels_is_skipped() {
        let dispatcher = AlertDispatcher::from_config(&AlertsConfig::default(), reqwest::Client::new());

        let outcome = dispatcher.dispatch(alert()).await;

        assert!(!dispatcher.has_channels());
        assert_eq!(outcome.label(), NO_CHANNELS_LABEL);
        assert_eq!(outcome.status(), STATUS_SKIPPED);
    }

    #[test]
    fn test_config_order_is_email_then_slack() {
        let config = AlertsConfig {
            slack_webhook_url: Some("https://hooks.example.com/x".to_string()),
            brevo_api_key: Some("key".to_string()),
            brevo_sender: Some("alerts@example.com".to_string()),
            ..Default::default()
        };

        let dispatcher = AlertDispatcher::from_config(&config, reqwest::Client::new());
        assert_eq!(dispatcher.channel_names(), vec!["email", "slack"]);
    }

    #[test]
    fn test_email_requires_sender() {
        let config = AlertsConfig {
            slack_webhook_url: Some("https://hooks.example.com/x".to_string()),
            brevo_api_key: Some("key".to_string()),
            ..Default::default()
        };

        let dispatcher = AlertDispatcher::from_config(&config, reqwest::Client::new());
        assert_eq!(dispatcher.channel_names(), vec!["slack"]);
    }
}
