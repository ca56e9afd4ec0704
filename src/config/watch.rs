// src/config/watch.rs
//! Watcher configuration: defaults → TOML file → environment.
//!
//! Built once in the binary and handed to the pipeline; nothing below `main` reads the
//! environment.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::classify::DEFAULT_SEAT_THRESHOLD;
use crate::normalize::normalize_labels;

pub const ENV_CONFIG_PATH: &str = "WATCH_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/watch.toml";

pub const DEFAULT_CALENDAR_URL: &str = "https://ana-blue-hangar-tour.resv.jp/reserve/calendar.php";
pub const DEFAULT_LEDGER_PATH: &str = "notified_dates.txt";

fn default_calendar_url() -> String {
    DEFAULT_CALENDAR_URL.to_string()
}
fn default_ledger_path() -> PathBuf {
    PathBuf::from(DEFAULT_LEDGER_PATH)
}
fn default_seat_threshold() -> u32 {
    DEFAULT_SEAT_THRESHOLD
}
fn default_max_pages() -> usize {
    2
}
fn default_http_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string()
}
fn default_utc_offset_hours() -> i32 {
    9
}
fn default_notify_title() -> String {
    "✈️ ANA工場見学 空きあり".to_string()
}
fn default_cell_selector() -> String {
    "td".to_string()
}
fn default_require_link() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LineCredentials {
    pub access_token: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub calendar_url: String,
    /// Enumerated tour times; empty means whole-cell extraction.
    pub timeslots: Vec<String>,
    pub ledger_path: PathBuf,
    pub seat_threshold: u32,
    pub max_pages: usize,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Offset that defines the run's calendar day (JST by default).
    pub utc_offset_hours: i32,
    pub notify_title: String,
    pub cell_selector: String,
    /// Only cells containing a link are bookable.
    pub require_link: bool,
    pub line: Option<LineCredentials>,
    pub slack_webhook_url: Option<String>,
    pub discord_webhook_url: Option<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            calendar_url: default_calendar_url(),
            timeslots: Vec::new(),
            ledger_path: default_ledger_path(),
            seat_threshold: default_seat_threshold(),
            max_pages: default_max_pages(),
            http_timeout_secs: default_http_timeout_secs(),
            user_agent: default_user_agent(),
            utc_offset_hours: default_utc_offset_hours(),
            notify_title: default_notify_title(),
            cell_selector: default_cell_selector(),
            require_link: default_require_link(),
            line: None,
            slack_webhook_url: None,
            discord_webhook_url: None,
        }
    }
}

fn parse_or_default<T: std::str::FromStr>(key: &str, raw: &str, default: T) -> T {
    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!(key, value = raw, "invalid numeric config value, using default");
            default
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl WatchConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: WatchConfig = toml::from_str(s).context("parsing watch config toml")?;
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading watch config from {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    /// Resolve the config file:
    /// 1) $WATCH_CONFIG_PATH (must exist)
    /// 2) config/watch.toml
    /// 3) built-in defaults
    ///
    /// then apply environment overrides and validate.
    pub fn load() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };
        base.with_env(|k| std::env::var(k).ok()).validate()
    }

    /// Apply environment-style overrides from `get`.
    pub fn with_env<F>(mut self, get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = non_empty(get("CALENDAR_URL")) {
            self.calendar_url = v;
        }
        if let Some(v) = non_empty(get("TARGET_TIMESLOTS")) {
            self.timeslots = v.split(',').map(str::to_string).collect();
        }
        if let Some(v) = non_empty(get("NOTIFIED_FILE")) {
            self.ledger_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty(get("SEAT_THRESHOLD")) {
            self.seat_threshold = parse_or_default("SEAT_THRESHOLD", &v, default_seat_threshold());
        }
        if let Some(v) = non_empty(get("MAX_PAGES")) {
            self.max_pages = parse_or_default("MAX_PAGES", &v, default_max_pages());
        }
        if let Some(v) = non_empty(get("HTTP_TIMEOUT_SECS")) {
            self.http_timeout_secs =
                parse_or_default("HTTP_TIMEOUT_SECS", &v, default_http_timeout_secs());
        }
        if let Some(v) = non_empty(get("WATCH_UTC_OFFSET_HOURS")) {
            self.utc_offset_hours =
                parse_or_default("WATCH_UTC_OFFSET_HOURS", &v, default_utc_offset_hours());
        }
        if let (Some(access_token), Some(user_id)) = (
            non_empty(get("LINE_ACCESS_TOKEN")),
            non_empty(get("LINE_USER_ID")),
        ) {
            self.line = Some(LineCredentials {
                access_token,
                user_id,
            });
        }
        if let Some(v) = non_empty(get("SLACK_WEBHOOK_URL")) {
            self.slack_webhook_url = Some(v);
        }
        if let Some(v) = non_empty(get("DISCORD_WEBHOOK_URL")) {
            self.discord_webhook_url = Some(v);
        }
        self
    }

    /// Check invariants and canonicalize timeslot labels.
    pub fn validate(mut self) -> Result<Self> {
        reqwest::Url::parse(&self.calendar_url)
            .map_err(|e| anyhow!("invalid calendar_url {:?}: {e}", self.calendar_url))?;
        if self.max_pages == 0 {
            bail!("max_pages must be at least 1");
        }
        if self.offset().is_none() {
            bail!("utc_offset_hours out of range: {}", self.utc_offset_hours);
        }
        self.timeslots = normalize_labels(&self.timeslots);
        self.seat_threshold = self.seat_threshold.max(1);
        Ok(self)
    }

    /// `None` selects whole-cell extraction.
    pub fn known_timeslots(&self) -> Option<&[String]> {
        (!self.timeslots.is_empty()).then_some(self.timeslots.as_slice())
    }

    fn offset(&self) -> Option<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
    }

    /// Today's date in the configured offset.
    pub fn today(&self) -> NaiveDate {
        let offset = self.offset().unwrap_or_else(|| Utc.fix());
        Utc::now().with_timezone(&offset).date_naive()
    }
}
