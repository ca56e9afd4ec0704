// src/ingest/types.rs
use anyhow::Result;
use reqwest::Url;

/// What the core needs from one rendered calendar page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarPage {
    pub url: Url,
    /// Text containing `<year>年<month>月`, if the page has one.
    pub header: Option<String>,
    /// Raw text of each bookable cell, in document order.
    pub cells: Vec<String>,
    /// Adjacent-month link, already resolved against `url`.
    pub next_url: Option<Url>,
}

/// Supplies rendered HTML for a URL.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
    fn name(&self) -> &'static str;
}
