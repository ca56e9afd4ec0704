// src/ingest/providers/fixture.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::collections::HashMap;

use crate::ingest::types::PageSource;

/// Serves stored HTML keyed by URL. Unknown URLs fail like a dead link would.
#[derive(Debug, Clone, Default)]
pub struct FixturePageSource {
    pages: HashMap<String, String>,
}

impl FixturePageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }
}

#[async_trait]
impl PageSource for FixturePageSource {
    async fn fetch(&self, url: &Url) -> Result<String> {
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| anyhow!("no fixture for {url}"))
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
