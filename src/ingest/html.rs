// src/ingest/html.rs
//! Calendar markup → [`CalendarPage`]. Uses `scraper`; tolerant of unknown markup
//! (unmatched pieces simply produce no cells).

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::calendar::header_span;
use crate::ingest::types::CalendarPage;

/// Which elements are calendar cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRules {
    pub selector: String,
    /// Skip cells without an `<a>` (not bookable).
    pub require_link: bool,
}

impl Default for CellRules {
    fn default() -> Self {
        Self {
            selector: "td".to_string(),
            require_link: true,
        }
    }
}

fn next_link_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"次月|翌月|(?i:next)").expect("next-month regex"))
}

fn selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| anyhow!("invalid selector {s:?}: {e}"))
}

/// Stripped text pieces joined by a single space.
fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn find_next_url(doc: &Html, page_url: &Url, anchors: &Selector) -> Option<Url> {
    doc.select(anchors).find_map(|a| {
        if !next_link_re().is_match(&element_text(&a)) {
            return None;
        }
        let href = a.value().attr("href")?.trim();
        let url = page_url.join(href).ok()?;
        matches!(url.scheme(), "http" | "https").then_some(url)
    })
}

pub fn parse_calendar(html: &str, page_url: &Url, rules: &CellRules) -> Result<CalendarPage> {
    let doc = Html::parse_document(html);
    let cell_sel = selector(&rules.selector)?;
    let link_sel = selector("a")?;
    let anchor_sel = selector("a[href]")?;

    let cells: Vec<String> = doc
        .select(&cell_sel)
        .filter(|cell| !rules.require_link || cell.select(&link_sel).next().is_some())
        .map(|cell| element_text(&cell))
        .filter(|t| !t.is_empty())
        .collect();

    let header = header_span(&element_text(&doc.root_element()));
    let next_url = find_next_url(&doc, page_url, &anchor_sel);

    Ok(CalendarPage {
        url: page_url.clone(),
        header,
        cells,
        next_url,
    })
}
