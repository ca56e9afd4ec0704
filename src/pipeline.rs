// src/pipeline.rs
//! One watcher run:
//! fetch pages → normalize → extract → classify → resolve date → dedup → notify.
//!
//! Strictly sequential. The only abort is a failure to load the first page (or the
//! ledger); everything after that degrades to skipping the affected page, cell or slot.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use reqwest::Url;

use crate::calendar::{parse_header, resolve};
use crate::classify::classify;
use crate::compose::{compose, MessageTemplate};
use crate::config::WatchConfig;
use crate::extract::extract;
use crate::fact::AvailabilityFact;
use crate::ingest::html::CellRules;
use crate::ingest::types::{CalendarPage, PageSource};
use crate::ingest::walk_pages;
use crate::ledger::{DedupLedger, LedgerStore};
use crate::normalize::normalize_text;
use crate::notify::Notifier;

/// One-time metrics registration (so series show up once a recorder is installed).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("watch_runs_total", "Watcher runs started.");
        describe_counter!("watch_pages_total", "Calendar pages fetched and parsed.");
        describe_counter!("watch_page_errors_total", "Pages skipped after a fetch/parse error.");
        describe_counter!("watch_fetch_errors_total", "HTTP errors while fetching pages.");
        describe_counter!("watch_candidates_total", "Raw slot candidates extracted.");
        describe_counter!("watch_new_facts_total", "Facts not yet notified today.");
        describe_counter!("watch_deduped_total", "Facts suppressed by the ledger.");
        describe_counter!("watch_notify_errors_total", "Notification channel failures.");
    });
}

/// Facts found on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOutcome {
    pub candidates: usize,
    pub facts: Vec<AvailabilityFact>,
}

/// Extract every available, not-past fact from a page.
///
/// A page without a parseable `年月` header yields nothing: its days cannot be dated.
pub fn page_facts(
    page: &CalendarPage,
    known_timeslots: Option<&[String]>,
    seat_threshold: u32,
    today: NaiveDate,
) -> PageOutcome {
    let Some(ym) = page.header.as_deref().and_then(parse_header) else {
        tracing::warn!(target: "watch", url = %page.url, "calendar header missing, page skipped");
        return PageOutcome::default();
    };

    let mut out = PageOutcome::default();
    for cell in &page.cells {
        let text = normalize_text(cell);
        for cand in extract(&text, known_timeslots) {
            out.candidates += 1;
            let Some(cls) = classify(&cand, seat_threshold) else {
                continue;
            };
            if !cls.is_available {
                continue;
            }
            let date = match resolve(cand.day, ym, today) {
                Ok(d) => d,
                Err(why) => {
                    tracing::trace!(target: "watch", day = cand.day, month = %ym, ?why, "candidate dropped");
                    continue;
                }
            };
            out.facts.push(AvailabilityFact {
                date,
                timeslot: cand.timeslot,
                status: cls.status,
                is_available: cls.is_available,
            });
        }
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub pages: usize,
    pub candidates: usize,
    /// Every available fact seen this run.
    pub facts: Vec<AvailabilityFact>,
    /// Facts not yet notified on this run date.
    pub new_facts: Vec<AvailabilityFact>,
    pub deduped: usize,
    pub message: Option<String>,
    pub ledger_lines_written: usize,
}

pub async fn run_once(
    cfg: &WatchConfig,
    source: &dyn PageSource,
    notifier: &dyn Notifier,
    store: &dyn LedgerStore,
    today: NaiveDate,
) -> Result<RunReport> {
    ensure_metrics_described();
    counter!("watch_runs_total").increment(1);

    let start = Url::parse(&cfg.calendar_url).context("calendar_url")?;
    let mut ledger = DedupLedger::load(store, today).await.context("loading ledger")?;

    let rules = CellRules {
        selector: cfg.cell_selector.clone(),
        require_link: cfg.require_link,
    };
    let pages = walk_pages(source, &start, cfg.max_pages, &rules).await?;

    let mut report = RunReport {
        pages: pages.len(),
        ..RunReport::default()
    };
    for page in &pages {
        let outcome = page_facts(page, cfg.known_timeslots(), cfg.seat_threshold, today);
        tracing::debug!(
            target: "watch",
            url = %page.url,
            cells = page.cells.len(),
            candidates = outcome.candidates,
            facts = outcome.facts.len(),
            "page parsed"
        );
        report.candidates += outcome.candidates;
        report.facts.extend(outcome.facts);
    }
    counter!("watch_candidates_total").increment(report.candidates as u64);

    for fact in &report.facts {
        let sig = fact.signature();
        if ledger.already_notified(&sig) {
            report.deduped += 1;
            continue;
        }
        ledger.record(&sig);
        report.new_facts.push(fact.clone());
    }
    counter!("watch_deduped_total").increment(report.deduped as u64);
    counter!("watch_new_facts_total").increment(report.new_facts.len() as u64);

    let template = MessageTemplate::new(cfg.notify_title.clone(), cfg.calendar_url.clone());
    let Some(message) = compose(&report.new_facts, &template) else {
        tracing::info!(
            target: "watch",
            pages = report.pages,
            facts = report.facts.len(),
            deduped = report.deduped,
            "no new availability"
        );
        return Ok(report);
    };

    if let Err(e) = notifier.send(&message).await {
        tracing::warn!(target: "watch", channel = notifier.name(), "notification failed: {e:#}");
        counter!("watch_notify_errors_total").increment(1);
    }

    match ledger.flush(store).await {
        Ok(n) => report.ledger_lines_written = n,
        Err(e) => tracing::error!(target: "watch", "ledger append failed: {e:#}"),
    }

    tracing::info!(
        target: "watch",
        pages = report.pages,
        new = report.new_facts.len(),
        deduped = report.deduped,
        "new availability notified"
    );
    report.message = Some(message);
    Ok(report)
}
