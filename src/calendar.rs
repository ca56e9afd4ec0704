// src/calendar.rs
//! Date resolution: calendar header (`2024年6月`) + cell day → absolute date.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::OnceCell;
use regex::Regex;
use std::fmt;

use crate::normalize::normalize_text;

/// Weekday labels, Monday first.
const WEEKDAYS: [&str; 7] = ["月", "火", "水", "木", "金", "土", "日"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}年{}月", self.year, self.month)
    }
}

/// Why a day could not become a notifiable date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRejection {
    /// Day does not exist in that month (e.g. 31 in June).
    InvalidDate,
    /// Strictly before today (trailing cells of the previous month).
    Past,
}

fn header_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(\d{4})\s*年\s*(\d{1,2})\s*月").expect("calendar header regex"))
}

/// First `<year>年<month>月` in `text` (full-width digits accepted).
pub fn parse_header(text: &str) -> Option<YearMonth> {
    let norm = normalize_text(text);
    let caps = header_re().captures(&norm)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    (1..=12).contains(&month).then_some(YearMonth { year, month })
}

/// The normalized `<year>年<month>月` span inside `text`, if any.
pub fn header_span(text: &str) -> Option<String> {
    let norm = normalize_text(text);
    header_re().find(&norm).map(|m| m.as_str().to_string())
}

pub fn resolve(day: u32, header: YearMonth, today: NaiveDate) -> Result<NaiveDate, DateRejection> {
    let date = NaiveDate::from_ymd_opt(header.year, header.month, day)
        .ok_or(DateRejection::InvalidDate)?;
    if date < today {
        return Err(DateRejection::Past);
    }
    Ok(date)
}

pub fn weekday_label(date: NaiveDate) -> &'static str {
    WEEKDAYS[date.weekday().num_days_from_monday() as usize]
}
