//! Calendar seat watcher — binary entrypoint.
//! One invocation = one run; scheduling is left to cron / CI.

use std::process::ExitCode;

use seat_watch::ingest::providers::HttpPageSource;
use seat_watch::ledger::FileLedger;
use seat_watch::{run_once, NotifierMux, WatchConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON lines with LOG_FORMAT=json.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("seat_watch=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = WatchConfig::load()?;
    let source = HttpPageSource::new(&cfg.user_agent, cfg.http_timeout_secs)?;
    let notifier = NotifierMux::from_config(&cfg);
    let ledger = FileLedger::new(cfg.ledger_path.clone());
    let today = cfg.today();

    tracing::info!(
        url = %cfg.calendar_url,
        %today,
        timeslots = ?cfg.timeslots,
        channels = ?notifier.channel_names(),
        "checking availability"
    );

    let report = run_once(&cfg, &source, &notifier, &ledger, today).await?;
    if let Some(msg) = &report.message {
        println!("{msg}");
    } else {
        println!("No slots found.");
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("run aborted: {e:#}");
            ExitCode::FAILURE
        }
    }
}
