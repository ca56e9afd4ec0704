// src/ingest/providers/http.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, Url};
use std::time::Duration;

use crate::ingest::types::PageSource;

/// Plain HTTP GET. Pages that need client-side rendering are out of reach for this
/// source; the calendar serves its grid server-side.
#[derive(Clone)]
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let resp = match self.client.get(url.clone()).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = ?e, %url, "page http error");
                counter!("watch_fetch_errors_total").increment(1);
                return Err(e).context("calendar http get()");
            }
        };
        let resp = resp
            .error_for_status()
            .with_context(|| format!("calendar non-2xx for {url}"))?;
        resp.text().await.context("calendar http .text()")
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
