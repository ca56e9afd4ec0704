// src/notify/mod.rs
//! Notification transports. Delivery is fire-and-forget: [`NotifierMux::notify`]
//! logs failures and never returns them.

pub mod discord;
pub mod line;
pub mod slack;

use anyhow::Result;
use metrics::counter;

use crate::config::WatchConfig;

pub use discord::DiscordNotifier;
pub use line::LineNotifier;
pub use slack::SlackNotifier;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Writes the message to the log. Used when no channel is configured.
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        tracing::info!(target: "notify", %message, "notification (no channel configured)");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Fans one message out to every configured channel.
pub struct NotifierMux {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    /// Channels with credentials in `cfg`; falls back to [`LogNotifier`].
    pub fn from_config(cfg: &WatchConfig) -> Self {
        let mut channels: Vec<Box<dyn Notifier>> = Vec::new();
        if let Some(line) = &cfg.line {
            channels.push(Box::new(
                LineNotifier::new(line.access_token.clone(), line.user_id.clone())
                    .with_timeout(cfg.http_timeout_secs),
            ));
        }
        if let Some(url) = &cfg.slack_webhook_url {
            channels.push(Box::new(SlackNotifier::new(url.clone())));
        }
        if let Some(url) = &cfg.discord_webhook_url {
            channels.push(Box::new(
                DiscordNotifier::new(url.clone()).with_timeout(cfg.http_timeout_secs),
            ));
        }
        if channels.is_empty() {
            tracing::debug!("no notification channel configured, logging only");
            channels.push(Box::new(LogNotifier));
        }
        Self { channels }
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }
}

#[async_trait::async_trait]
impl Notifier for NotifierMux {
    /// Always `Ok`; per-channel errors are logged and counted.
    async fn send(&self, message: &str) -> Result<()> {
        for ch in &self.channels {
            if let Err(e) = ch.send(message).await {
                tracing::warn!(target: "notify", channel = ch.name(), "send failed: {e:#}");
                counter!("watch_notify_errors_total").increment(1);
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mux"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::sync::{Arc, Mutex};

    struct Failing;

    #[async_trait::async_trait]
    impl Notifier for Failing {
        async fn send(&self, _message: &str) -> Result<()> {
            bail!("transport down")
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct Recording(Arc<Mutex<Vec<String>>>);

    #[async_trait::async_trait]
    impl Notifier for Recording {
        async fn send(&self, message: &str) -> Result<()> {
            self.0.lock().unwrap().push(message.to_string());
            Ok(())
        }
        fn name(&self) -> &'static str {
            "recording"
        }
    }

    #[tokio::test]
    async fn failure_is_swallowed_and_other_channels_still_fire() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mux = NotifierMux::new(vec![Box::new(Failing), Box::new(Recording(seen.clone()))]);
        assert!(mux.send("hello").await.is_ok());
        assert_eq!(*seen.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[test]
    fn from_config_picks_channels() {
        let mut cfg = WatchConfig::default();
        assert_eq!(NotifierMux::from_config(&cfg).channel_names(), vec!["log"]);

        cfg.line = Some(crate::config::LineCredentials {
            access_token: "t".into(),
            user_id: "u".into(),
        });
        cfg.slack_webhook_url = Some("https://hooks.slack.test/x".into());
        assert_eq!(
            NotifierMux::from_config(&cfg).channel_names(),
            vec!["line", "slack"]
        );
    }
}
