// src/notify/line.rs
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::Notifier;

pub const LINE_PUSH_URL: &str = "https://api.line.me/v2/bot/message/push";

/// LINE Messaging API push to a single user.
pub struct LineNotifier {
    access_token: String,
    user_id: String,
    client: Client,
    timeout: Duration,
}

impl LineNotifier {
    pub fn new(access_token: String, user_id: String) -> Self {
        Self {
            access_token,
            user_id,
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Serialize, PartialEq)]
struct PushPayload<'a> {
    to: &'a str,
    messages: Vec<TextMessage<'a>>,
}

impl<'a> PushPayload<'a> {
    fn text(to: &'a str, text: &'a str) -> Self {
        Self {
            to,
            messages: vec![TextMessage { kind: "text", text }],
        }
    }
}

#[async_trait::async_trait]
impl Notifier for LineNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        let payload = PushPayload::text(&self.user_id, message);
        self.client
            .post(LINE_PUSH_URL)
            .bearer_auth(&self.access_token)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .context("line push")?
            .error_for_status()
            .context("line non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "line"
    }
}
