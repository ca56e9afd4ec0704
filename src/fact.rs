// src/fact.rs
use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::weekday_label;
use crate::classify::SeatStatus;
use crate::extract::ClockTime;

/// A classified, date-resolved observation for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityFact {
    pub date: NaiveDate,
    pub timeslot: Option<String>,
    pub status: SeatStatus,
    pub is_available: bool,
}

impl AvailabilityFact {
    pub fn status_label(&self) -> String {
        self.status.to_string()
    }

    /// Ledger key. Includes the status, so a changed seat count is a new fact.
    pub fn signature(&self) -> String {
        format!(
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.timeslot.as_deref().unwrap_or("-"),
            self.status
        )
    }

    /// Human-readable line, e.g. `06/27(木) 10:45 残り3席`.
    pub fn display(&self) -> String {
        let day = format!("{}({})", self.date.format("%m/%d"), weekday_label(self.date));
        match &self.timeslot {
            Some(t) => format!("{day} {t} {}", self.status),
            None => format!("{day} {}", self.status),
        }
    }

    /// Chronological order: date, then clock minutes (day-level facts first), then label.
    pub fn sort_key(&self) -> (NaiveDate, Option<u32>, String) {
        let minutes = self
            .timeslot
            .as_deref()
            .and_then(ClockTime::parse)
            .map(ClockTime::minutes);
        (self.date, minutes, self.status_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Symbol;

    fn fact(day: u32, slot: Option<&str>, status: SeatStatus) -> AvailabilityFact {
        AvailabilityFact {
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            timeslot: slot.map(str::to_string),
            status,
            is_available: true,
        }
    }

    #[test]
    fn signature_encodes_date_slot_and_status() {
        let f = fact(27, Some("10:45"), SeatStatus::Remaining(3));
        assert_eq!(f.signature(), "2024-06-27 10:45 残り3席");
        let g = fact(27, Some("10:45"), SeatStatus::Remaining(10));
        assert_ne!(f.signature(), g.signature());
    }

    #[test]
    fn day_level_signature_uses_dash() {
        let f = fact(28, None, SeatStatus::Plenty(Symbol::Circle));
        assert_eq!(f.signature(), "2024-06-28 - 余裕あり(○)");
        assert_eq!(f.display(), "06/28(金) 余裕あり(○)");
    }

    #[test]
    fn display_line() {
        let f = fact(27, Some("10:45"), SeatStatus::Remaining(3));
        assert_eq!(f.display(), "06/27(木) 10:45 残り3席");
    }

    #[test]
    fn sort_key_orders_clock_numerically() {
        let early = fact(27, Some("9:30"), SeatStatus::Limited);
        let late = fact(27, Some("10:45"), SeatStatus::Limited);
        assert!(early.sort_key() < late.sort_key());
    }
}
