// tests/pipeline_e2e.rs
//
// Whole runs against fixture pages: extraction, date rules, dedup and ledger writes.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use chrono::NaiveDate;
use seat_watch::classify::SeatStatus;
use seat_watch::ingest::providers::FixturePageSource;
use seat_watch::ledger::{LedgerStore, MemoryLedger};
use seat_watch::{run_once, Notifier, WatchConfig};

const URL: &str = "https://cal.test/reserve/calendar.php";
const NEXT: &str = "https://cal.test/reserve/calendar.php?ym=2024-07";

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    fn sent(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for Recorder {
    async fn send(&self, message: &str) -> Result<()> {
        self.0.lock().unwrap().push(message.to_string());
        Ok(())
    }
    fn name(&self) -> &'static str {
        "recorder"
    }
}

struct Broken;

#[async_trait::async_trait]
impl Notifier for Broken {
    async fn send(&self, _message: &str) -> Result<()> {
        bail!("push endpoint unreachable")
    }
    fn name(&self) -> &'static str {
        "broken"
    }
}

fn june_page(cells: &[&str]) -> String {
    let tds: String = cells
        .iter()
        .map(|c| format!(r#"<td><a href="r">{c}</a></td>"#))
        .collect();
    format!(
        r#"<html><body><h2>2024年6月</h2><a href="?ym=2024-07">次月</a>
        <table><tr>{tds}</tr></table></body></html>"#
    )
}

fn cfg(timeslots: &[&str]) -> WatchConfig {
    let mut c = WatchConfig::default();
    c.calendar_url = URL.to_string();
    c.timeslots = timeslots.iter().map(|s| s.to_string()).collect();
    c.max_pages = 1;
    c.validate().unwrap()
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

#[tokio::test]
async fn spec_example_one_fact() {
    let src = FixturePageSource::new().with_page(URL, june_page(&["27残310:45"]));
    let store = MemoryLedger::new();
    let rec = Recorder::default();

    let report = run_once(&cfg(&["9:30", "10:45"]), &src, &rec, &store, date(6, 27))
        .await
        .unwrap();

    assert_eq!(report.new_facts.len(), 1);
    let f = &report.new_facts[0];
    assert_eq!(f.date, date(6, 27));
    assert_eq!(f.timeslot.as_deref(), Some("10:45"));
    assert_eq!(f.status, SeatStatus::Remaining(3));
    assert_eq!(f.status_label(), "残り3席");
    assert!(f.is_available);

    let sent = rec.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("06/27(木) 10:45 残り3席"));
    assert!(sent[0].ends_with(&format!("予約: {URL}")));
    assert_eq!(store.snapshot(), vec!["2024-06-27: 2024-06-27 10:45 残り3席".to_string()]);
}

#[tokio::test]
async fn past_days_are_never_reported() {
    let src = FixturePageSource::new().with_page(URL, june_page(&["2○", "28○"]));
    let store = MemoryLedger::new();
    let report = run_once(&cfg(&[]), &src, &Recorder::default(), &store, date(6, 27))
        .await
        .unwrap();
    assert_eq!(report.new_facts.len(), 1);
    assert_eq!(report.new_facts[0].date, date(6, 28));
}

#[tokio::test]
async fn second_identical_run_is_silent() {
    let src = FixturePageSource::new().with_page(URL, june_page(&["28○9:30", "29残210:45"]));
    let store = MemoryLedger::new();
    let rec = Recorder::default();
    let c = cfg(&["9:30", "10:45"]);

    let first = run_once(&c, &src, &rec, &store, date(6, 27)).await.unwrap();
    assert_eq!(first.new_facts.len(), 2);

    let second = run_once(&c, &src, &rec, &store, date(6, 27)).await.unwrap();
    assert!(second.new_facts.is_empty());
    assert_eq!(second.deduped, 2);
    assert!(second.message.is_none());
    assert_eq!(rec.sent().len(), 1);
    assert_eq!(store.snapshot().len(), 2);
}

#[tokio::test]
async fn ledger_rearms_next_day() {
    let src = FixturePageSource::new().with_page(URL, june_page(&["30○"]));
    let store = MemoryLedger::new();
    let rec = Recorder::default();
    let c = cfg(&[]);

    run_once(&c, &src, &rec, &store, date(6, 27)).await.unwrap();
    let next_day = run_once(&c, &src, &rec, &store, date(6, 28)).await.unwrap();

    assert_eq!(next_day.new_facts.len(), 1);
    assert_eq!(rec.sent().len(), 2);
    assert_eq!(
        store.snapshot(),
        vec![
            "2024-06-27: 2024-06-30 - 余裕あり(○)".to_string(),
            "2024-06-28: 2024-06-30 - 余裕あり(○)".to_string(),
        ]
    );
}

#[tokio::test]
async fn changed_seat_count_renotifies_same_day() {
    let c = cfg(&["10:45"]);
    let store = MemoryLedger::new();
    let rec = Recorder::default();

    let before = FixturePageSource::new().with_page(URL, june_page(&["28残110:45"]));
    run_once(&c, &before, &rec, &store, date(6, 27)).await.unwrap();

    let after = FixturePageSource::new().with_page(URL, june_page(&["28残1010:45"]));
    let report = run_once(&c, &after, &rec, &store, date(6, 27)).await.unwrap();
    assert_eq!(report.new_facts.len(), 1);
    assert_eq!(report.new_facts[0].status, SeatStatus::Remaining(10));
}

#[tokio::test]
async fn symbol_outranks_count_end_to_end() {
    let src = FixturePageSource::new().with_page(URL, june_page(&["28○残1"]));
    let report = run_once(&cfg(&[]), &src, &Recorder::default(), &MemoryLedger::new(), date(6, 27))
        .await
        .unwrap();
    assert_eq!(report.new_facts[0].status_label(), "余裕あり(○)");
}

#[tokio::test]
async fn zero_seats_produce_no_fact() {
    let src = FixturePageSource::new().with_page(URL, june_page(&["28残09:30"]));
    let store = MemoryLedger::new();
    let report = run_once(&cfg(&["9:30"]), &src, &Recorder::default(), &store, date(6, 27))
        .await
        .unwrap();
    assert!(report.facts.is_empty());
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn failed_first_fetch_aborts_without_ledger_write() {
    let src = FixturePageSource::new();
    let store = MemoryLedger::new();
    let rec = Recorder::default();
    assert!(run_once(&cfg(&[]), &src, &rec, &store, date(6, 27)).await.is_err());
    assert!(rec.sent().is_empty());
    assert!(store.read_lines().await.unwrap().is_empty());
}

#[tokio::test]
async fn transport_failure_still_records() {
    let src = FixturePageSource::new().with_page(URL, june_page(&["28△"]));
    let store = MemoryLedger::new();
    let report = run_once(&cfg(&[]), &src, &Broken, &store, date(6, 27)).await.unwrap();
    assert!(report.message.is_some());
    assert_eq!(store.snapshot().len(), 1);
}

#[tokio::test]
async fn next_month_page_is_processed() {
    let july = r#"<html><body><h2>2024年7月</h2>
        <table><tr><td><a href="r">1○</a></td><td><a href="r">31</a></td></tr></table>
        </body></html>"#;
    let src = FixturePageSource::new()
        .with_page(URL, june_page(&["29△"]))
        .with_page(NEXT, july);
    let mut c = cfg(&[]);
    c.max_pages = 2;
    let rec = Recorder::default();

    let report = run_once(&c, &src, &rec, &MemoryLedger::new(), date(6, 27)).await.unwrap();
    assert_eq!(report.pages, 2);
    let dates: Vec<_> = report.new_facts.iter().map(|f| f.date).collect();
    assert_eq!(dates, vec![date(6, 29), date(7, 1)]);

    let msg = report.message.unwrap();
    let june = msg.find("06/29").unwrap();
    let july_pos = msg.find("07/01").unwrap();
    assert!(june < july_pos);
}

#[tokio::test]
async fn headerless_next_page_is_skipped_not_fatal() {
    let broken = r#"<table><tr><td><a href="r">5○</a></td></tr></table>"#;
    let src = FixturePageSource::new()
        .with_page(URL, june_page(&["29△"]))
        .with_page(NEXT, broken);
    let mut c = cfg(&[]);
    c.max_pages = 2;

    let report = run_once(&c, &src, &Recorder::default(), &MemoryLedger::new(), date(6, 27))
        .await
        .unwrap();
    assert_eq!(report.pages, 2);
    assert_eq!(report.new_facts.len(), 1);
}
