// src/extract/mod.rs
//! Slot extraction: normalized cell text → raw availability candidates.
//!
//! Two modes:
//! - known timeslots: each configured label is located in the cell, the nearest glyph
//!   before it and a seat count anchored right before it are read;
//! - whole cell: the cell is tokenized and glyphs / seat counts are grouped by the
//!   clock token that follows them.

pub mod tokens;

use serde::Serialize;

pub use tokens::{ClockTime, Symbol};
use tokens::{leading_day, seats_ending_at, symbol_before, tokenize, Token};

/// How far back (in chars) a glyph may sit before its timeslot label.
pub const SYMBOL_WINDOW: usize = 10;

/// One unclassified availability signal for a day (and optionally a timeslot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawCandidate {
    pub day: u32,
    pub timeslot: Option<String>,
    pub symbol: Option<Symbol>,
    pub seats: Option<u32>,
}

impl RawCandidate {
    fn has_signal(&self) -> bool {
        self.symbol.is_some() || self.seats.is_some()
    }
}

/// Extract candidates from one normalized cell.
///
/// A cell without a leading day number yields nothing. `known_timeslots` must already
/// be normalized (see [`crate::normalize::normalize_labels`]).
pub fn extract(cell_text: &str, known_timeslots: Option<&[String]>) -> Vec<RawCandidate> {
    let chars: Vec<char> = cell_text.chars().collect();
    let Some((day, body)) = leading_day(&chars) else {
        return Vec::new();
    };

    match known_timeslots {
        Some(labels) if !labels.is_empty() => extract_known(&chars, day, body, labels),
        _ => extract_whole(&chars, day, body),
    }
}

fn find_all(hay: &[char], needle: &[char], from: usize) -> Vec<usize> {
    if needle.is_empty() || hay.len() < needle.len() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut i = from;
    while i + needle.len() <= hay.len() {
        if hay[i..i + needle.len()] == *needle {
            out.push(i);
            i += needle.len();
        } else {
            i += 1;
        }
    }
    out
}

/// True when the label at `pos` is really the tail of a longer configured label
/// (`9:30` inside `19:30`).
fn inside_longer_label(hay: &[char], floor: usize, pos: usize, label: &[char], all: &[Vec<char>]) -> bool {
    all.iter().any(|other| {
        if other.len() <= label.len() || !other.ends_with(label) {
            return false;
        }
        let extra = other.len() - label.len();
        pos >= floor + extra && hay[pos - extra..pos + label.len()] == other[..]
    })
}

fn extract_known(chars: &[char], day: u32, body: usize, labels: &[String]) -> Vec<RawCandidate> {
    let label_chars: Vec<Vec<char>> = labels.iter().map(|l| l.chars().collect()).collect();
    let mut out = Vec::new();

    for (label, lc) in labels.iter().zip(&label_chars) {
        for pos in find_all(chars, lc, body) {
            // A trailing digit means this is a prefix of some other number.
            if chars.get(pos + lc.len()).is_some_and(|c| c.is_ascii_digit()) {
                continue;
            }
            if inside_longer_label(chars, body, pos, lc, &label_chars) {
                continue;
            }
            let cand = RawCandidate {
                day,
                timeslot: Some(label.clone()),
                symbol: symbol_before(chars, body, pos, SYMBOL_WINDOW),
                seats: seats_ending_at(chars, body, pos),
            };
            if cand.has_signal() {
                out.push(cand);
            }
        }
    }
    out
}

fn extract_whole(chars: &[char], day: u32, body: usize) -> Vec<RawCandidate> {
    let mut out = Vec::new();
    let mut symbol: Option<Symbol> = None;
    let mut seats: Option<u32> = None;
    // Last clock seen, and whether it already produced a candidate.
    let mut last_clock: Option<(ClockTime, bool)> = None;

    for t in tokenize(chars, body) {
        match t.token {
            // First glyph in a group wins; a later one belongs to the next slot only
            // after a clock closes the group.
            Token::Symbol(s) => {
                symbol.get_or_insert(s);
            }
            Token::Seats(n) => {
                seats.get_or_insert(n);
            }
            Token::Clock(clock) => {
                let cand = RawCandidate {
                    day,
                    timeslot: Some(clock.label()),
                    symbol: symbol.take(),
                    seats: seats.take(),
                };
                let produced = cand.has_signal();
                if produced {
                    out.push(cand);
                }
                last_clock = Some((clock, produced));
            }
        }
    }

    // Signals after the last clock: attach to that clock if it had none, else keep them
    // at day level.
    if symbol.is_some() || seats.is_some() {
        let timeslot = match last_clock {
            Some((clock, false)) => Some(clock.label()),
            _ => None,
        };
        out.push(RawCandidate {
            day,
            timeslot,
            symbol,
            seats,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(ls: &[&str]) -> Vec<String> {
        ls.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_day_no_candidates() {
        assert!(extract("○ 9:30", None).is_empty());
        assert!(extract("残3 10:45", Some(labels(&["10:45"]).as_slice())).is_empty());
    }

    #[test]
    fn known_slot_reads_anchored_seat_count() {
        let got = extract("27残310:45", Some(labels(&["9:30", "10:45"]).as_slice()));
        assert_eq!(
            got,
            vec![RawCandidate {
                day: 27,
                timeslot: Some("10:45".into()),
                symbol: None,
                seats: Some(3),
            }]
        );
    }

    #[test]
    fn known_slot_does_not_take_hour_digit() {
        let got = extract("2残19:30", Some(labels(&["9:30"]).as_slice()));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].seats, Some(1));
        assert_eq!(got[0].day, 2);
    }

    #[test]
    fn known_slot_prefers_longer_label() {
        let got = extract("5残119:30", Some(labels(&["9:30", "19:30"]).as_slice()));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].timeslot.as_deref(), Some("19:30"));
        assert_eq!(got[0].seats, Some(1));
    }

    #[test]
    fn known_slot_symbol_lookbehind() {
        let got = extract("28○9:30△10:45", Some(labels(&["9:30", "10:45", "13:00"]).as_slice()));
        let pairs: Vec<_> = got
            .iter()
            .map(|c| (c.timeslot.clone().unwrap_or_default(), c.symbol))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("9:30".to_string(), Some(Symbol::Circle)),
                ("10:45".to_string(), Some(Symbol::Triangle)),
            ]
        );
    }

    #[test]
    fn known_slot_without_signal_is_skipped() {
        assert!(extract("28 9:30 10:45", Some(labels(&["9:30", "10:45"]).as_slice())).is_empty());
    }

    #[test]
    fn empty_label_list_falls_back_to_whole_cell() {
        let got = extract("28○", Some(Vec::new().as_slice()));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].timeslot, None);
    }

    #[test]
    fn whole_cell_groups_by_clock() {
        let got = extract("27○9:30残110:45×13:00", None);
        assert_eq!(got.len(), 3);
        assert_eq!(got[0].timeslot.as_deref(), Some("9:30"));
        assert_eq!(got[0].symbol, Some(Symbol::Circle));
        assert_eq!(got[1].timeslot.as_deref(), Some("10:45"));
        assert_eq!(got[1].seats, Some(1));
        assert_eq!(got[2].symbol, Some(Symbol::Cross));
    }

    #[test]
    fn whole_cell_day_level_signal() {
        let got = extract("14 ◎", None);
        assert_eq!(
            got,
            vec![RawCandidate {
                day: 14,
                timeslot: None,
                symbol: Some(Symbol::DoubleCircle),
                seats: None,
            }]
        );
    }

    #[test]
    fn whole_cell_trailing_signal_attaches_to_bare_clock() {
        let got = extract("14 9:30 残2", None);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].timeslot.as_deref(), Some("9:30"));
        assert_eq!(got[0].seats, Some(2));
    }

    #[test]
    fn whole_cell_plain_day_yields_nothing() {
        assert!(extract("30", None).is_empty());
        assert!(extract("30 9:30", None).is_empty());
    }
}
