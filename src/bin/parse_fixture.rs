//! Parse a saved calendar page and print what the watcher would see.
//! Never notifies and never touches the ledger.
//!
//! Usage: `parse_fixture <page.html> [<page.html> ...]`

use std::path::PathBuf;

use reqwest::Url;
use seat_watch::ingest::html::{parse_calendar, CellRules};
use seat_watch::pipeline::page_facts;
use seat_watch::WatchConfig;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        anyhow::bail!("usage: parse_fixture <page.html> [<page.html> ...]");
    }

    let cfg = WatchConfig::load()?;
    let today = cfg.today();
    let base = Url::parse(&cfg.calendar_url)?;
    let rules = CellRules {
        selector: cfg.cell_selector.clone(),
        require_link: cfg.require_link,
    };

    for path in paths {
        let html = std::fs::read_to_string(&path)?;
        let page = parse_calendar(&html, &base, &rules)?;
        let outcome = page_facts(&page, cfg.known_timeslots(), cfg.seat_threshold, today);

        println!(
            "{}: header={:?} cells={} candidates={} facts={}",
            path.display(),
            page.header,
            page.cells.len(),
            outcome.candidates,
            outcome.facts.len()
        );
        for f in &outcome.facts {
            println!("  {}    [{}]", f.display(), f.signature());
        }
    }
    Ok(())
}
