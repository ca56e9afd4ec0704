// src/ledger.rs
//! Dedup ledger: append-only lines `"<run_date>: <signature>"`.
//!
//! Read in full at run start, consulted per fact, appended once at run end. A
//! signature only suppresses re-notification on the run date it was written under, so
//! the ledger re-arms every day. No compaction.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Line-oriented, append-only storage.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    /// All lines written so far; empty when the store does not exist yet.
    async fn read_lines(&self) -> Result<Vec<String>>;
    async fn append_lines(&self, lines: &[String]) -> Result<()>;
}

/// Plain text file, one record per line.
#[derive(Debug, Clone)]
pub struct FileLedger {
    path: PathBuf,
}

impl FileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl LedgerStore for FileLedger {
    async fn read_lines(&self) -> Result<Vec<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(s) => Ok(s
                .lines()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e).with_context(|| format!("reading ledger {}", self.path.display())),
        }
    }

    async fn append_lines(&self, lines: &[String]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating ledger dir {}", dir.display()))?;
        }
        let mut buf = String::new();
        for l in lines {
            buf.push_str(l);
            buf.push('\n');
        }
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening ledger {}", self.path.display()))?;
        f.write_all(buf.as_bytes()).await.context("appending ledger")?;
        f.flush().await.context("flushing ledger")?;
        Ok(())
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    lines: Mutex<Vec<String>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lines.lock().expect("ledger mutex poisoned").clone()
    }
}

#[async_trait::async_trait]
impl LedgerStore for MemoryLedger {
    async fn read_lines(&self) -> Result<Vec<String>> {
        Ok(self.snapshot())
    }

    async fn append_lines(&self, lines: &[String]) -> Result<()> {
        self.lines
            .lock()
            .expect("ledger mutex poisoned")
            .extend_from_slice(lines);
        Ok(())
    }
}

pub fn record_line(run_date: NaiveDate, signature: &str) -> String {
    format!("{}: {}", run_date.format("%Y-%m-%d"), signature)
}

/// True iff a history line was written under `run_date` and contains `signature`.
pub fn already_notified(signature: &str, run_date: NaiveDate, history: &[String]) -> bool {
    let prefix = run_date.format("%Y-%m-%d").to_string();
    history
        .iter()
        .any(|l| l.starts_with(&prefix) && l.contains(signature))
}

/// Per-run view over the ledger: loaded history plus this run's pending records.
#[derive(Debug, Clone)]
pub struct DedupLedger {
    run_date: NaiveDate,
    history: Vec<String>,
    pending: Vec<String>,
}

impl DedupLedger {
    pub fn new(run_date: NaiveDate, history: Vec<String>) -> Self {
        Self {
            run_date,
            history,
            pending: Vec::new(),
        }
    }

    pub async fn load(store: &dyn LedgerStore, run_date: NaiveDate) -> Result<Self> {
        let history = store.read_lines().await?;
        tracing::debug!(target: "ledger", lines = history.len(), "ledger loaded");
        Ok(Self::new(run_date, history))
    }

    /// Checks history and what this run has already recorded.
    pub fn already_notified(&self, signature: &str) -> bool {
        already_notified(signature, self.run_date, &self.history)
            || already_notified(signature, self.run_date, &self.pending)
    }

    /// Buffer a signature; nothing is written until [`DedupLedger::flush`].
    pub fn record(&mut self, signature: &str) {
        self.pending.push(record_line(self.run_date, signature));
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Append buffered records, if any. Returns how many lines were written.
    pub async fn flush(&mut self, store: &dyn LedgerStore) -> Result<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        store.append_lines(&self.pending).await?;
        let n = self.pending.len();
        self.history.append(&mut self.pending);
        Ok(n)
    }
}
