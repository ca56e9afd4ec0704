// src/ingest/mod.rs
pub mod html;
pub mod providers;
pub mod types;

use anyhow::{Context, Result};
use metrics::counter;
use reqwest::Url;

use crate::ingest::html::{parse_calendar, CellRules};
use crate::ingest::types::{CalendarPage, PageSource};

/// Fetch and parse the start page, then follow next-month links up to `max_pages`.
///
/// The start page is mandatory: any failure there is returned and the run must abort.
/// A failure on a later page ends the walk; pages already read are kept.
pub async fn walk_pages(
    source: &dyn PageSource,
    start: &Url,
    max_pages: usize,
    rules: &CellRules,
) -> Result<Vec<CalendarPage>> {
    let html = source
        .fetch(start)
        .await
        .with_context(|| format!("loading calendar {start}"))?;
    let first = parse_calendar(&html, start, rules)?;
    counter!("watch_pages_total").increment(1);

    let mut seen = vec![start.clone()];
    let mut next = first.next_url.clone();
    let mut pages = vec![first];

    while pages.len() < max_pages {
        let Some(url) = next.take() else { break };
        if seen.contains(&url) {
            tracing::debug!(target: "ingest", %url, "next link loops back, stopping");
            break;
        }
        seen.push(url.clone());

        let page = match source.fetch(&url).await {
            Ok(html) => parse_calendar(&html, &url, rules),
            Err(e) => Err(e),
        };
        match page {
            Ok(p) => {
                counter!("watch_pages_total").increment(1);
                next = p.next_url.clone();
                pages.push(p);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, provider = source.name(), %url, "page skipped");
                counter!("watch_page_errors_total").increment(1);
                break;
            }
        }
    }

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::providers::FixturePageSource;

    fn page(next: Option<&str>) -> String {
        let link = next
            .map(|n| format!(r#"<a href="{n}">次月</a>"#))
            .unwrap_or_default();
        format!("<p>2024年6月</p>{link}<table><tr><td><a>28○</a></td></tr></table>")
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn follows_next_link_up_to_limit() {
        let src = FixturePageSource::new()
            .with_page("https://cal.test/a", page(Some("/b")))
            .with_page("https://cal.test/b", page(Some("/c")))
            .with_page("https://cal.test/c", page(None));
        let pages = walk_pages(&src, &url("https://cal.test/a"), 2, &CellRules::default())
            .await
            .unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].url.as_str(), "https://cal.test/b");
    }

    #[tokio::test]
    async fn first_page_failure_is_an_error() {
        let src = FixturePageSource::new();
        assert!(walk_pages(&src, &url("https://cal.test/a"), 2, &CellRules::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn later_failure_keeps_earlier_pages() {
        let src = FixturePageSource::new().with_page("https://cal.test/a", page(Some("/gone")));
        let pages = walk_pages(&src, &url("https://cal.test/a"), 3, &CellRules::default())
            .await
            .unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[tokio::test]
    async fn self_link_is_not_revisited() {
        let src = FixturePageSource::new().with_page("https://cal.test/a", page(Some("/a")));
        let pages = walk_pages(&src, &url("https://cal.test/a"), 5, &CellRules::default())
            .await
            .unwrap();
        assert_eq!(pages.len(), 1);
    }
}
