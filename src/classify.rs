// src/classify.rs
//! # Availability Classifier
//! Pure mapping `RawCandidate` → seat status. No I/O.
//!
//! Policy: a glyph outranks any number in the same slot (`○`/`◎` plenty, `△` limited,
//! `×` full). Without a glyph, a remaining-seat count is available when it reaches the
//! configured threshold.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::extract::{RawCandidate, Symbol};

/// Seat threshold used when nothing is configured.
pub const DEFAULT_SEAT_THRESHOLD: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeatStatus {
    /// `○` or `◎`; carries the glyph for display.
    Plenty(Symbol),
    Limited,
    Remaining(u32),
    Full,
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeatStatus::Plenty(sym) => write!(f, "余裕あり({})", sym.glyph()),
            SeatStatus::Limited => write!(f, "残りわずか(△)"),
            SeatStatus::Remaining(n) => write!(f, "残り{n}席"),
            SeatStatus::Full => write!(f, "満席(×)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub status: SeatStatus,
    pub is_available: bool,
}

/// `None` when the candidate carries no signal at all.
pub fn classify(candidate: &RawCandidate, seat_threshold: u32) -> Option<Classification> {
    if let Some(sym) = candidate.symbol {
        let status = match sym {
            Symbol::DoubleCircle | Symbol::Circle => SeatStatus::Plenty(sym),
            Symbol::Triangle => SeatStatus::Limited,
            Symbol::Cross => SeatStatus::Full,
        };
        return Some(Classification {
            status,
            is_available: status != SeatStatus::Full,
        });
    }

    let seats = candidate.seats?;
    Some(Classification {
        status: SeatStatus::Remaining(seats),
        is_available: seats >= seat_threshold.max(1),
    })
}
