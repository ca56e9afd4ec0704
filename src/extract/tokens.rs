// src/extract/tokens.rs
//! Token classes for calendar cells: day number, availability glyph, remaining-seat
//! count and clock time.
//!
//! All positions are char indices into the normalized cell text. The one rule every
//! digit-consuming token obeys: a digit run that runs straight into `:dd` donates its
//! trailing one or two digits to the clock hour (see [`split_before_clock`]).

use serde::{Deserialize, Serialize};

/// Qualitative availability glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    DoubleCircle,
    Circle,
    Triangle,
    Cross,
}

impl Symbol {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '◎' => Some(Symbol::DoubleCircle),
            '○' | '〇' | '◯' => Some(Symbol::Circle),
            '△' | '▲' => Some(Symbol::Triangle),
            '×' | '✕' | '✖' | '╳' => Some(Symbol::Cross),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Symbol::DoubleCircle => '◎',
            Symbol::Circle => '○',
            Symbol::Triangle => '△',
            Symbol::Cross => '×',
        }
    }
}

/// `H:MM` clock time as printed on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    pub fn label(self) -> String {
        format!("{}:{:02}", self.hour, self.minute)
    }

    pub fn minutes(self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }

    /// Parse a whole label such as `9:30` or `10:45`.
    pub fn parse(label: &str) -> Option<Self> {
        let (h, m) = label.split_once(':')?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return None;
        }
        if !h.chars().chain(m.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }
        let hour: u8 = h.parse().ok()?;
        let minute: u8 = m.parse().ok()?;
        (hour <= 23 && minute <= 59).then_some(ClockTime { hour, minute })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Symbol(Symbol),
    Seats(u32),
    Clock(ClockTime),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

/// Markers that introduce a remaining-seat count, longest first.
const SEAT_MARKERS: [&str; 3] = ["残り", "残席", "残"];
const SEAT_SUFFIX: char = '席';

/// Length of the digit run starting at `i`.
fn digit_run(chars: &[char], i: usize) -> usize {
    chars[i..].iter().take_while(|c| c.is_ascii_digit()).count()
}

/// Minute part (`:dd` not followed by another digit) starting at `i`.
fn clock_tail(chars: &[char], i: usize) -> Option<u8> {
    if chars.get(i) != Some(&':') {
        return None;
    }
    let d1 = chars.get(i + 1)?.to_digit(10)?;
    let d2 = chars.get(i + 2)?.to_digit(10)?;
    if chars.get(i + 3).is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    let minute = (d1 * 10 + d2) as u8;
    (minute <= 59).then_some(minute)
}

fn digits_value(digits: &[char]) -> Option<u32> {
    digits.iter().collect::<String>().parse().ok()
}

/// Split a digit run that is immediately followed by `:dd` into `(prefix, hour)`.
///
/// The hour takes two digits when that leaves a non-empty prefix and reads as a valid
/// hour, otherwise one. `"310"` → `("3", "10")`, `"19"` → `("1", "9")`,
/// `"289"` → `("28", "9")`, `"9"` → `("", "9")`.
pub fn split_before_clock(run: &[char]) -> (&[char], &[char]) {
    let n = run.len();
    if n >= 3 {
        let two = &run[n - 2..];
        if digits_value(two).is_some_and(|h| h <= 23) {
            return run.split_at(n - 2);
        }
    }
    if n >= 1 {
        return run.split_at(n - 1);
    }
    (run, run)
}

/// Hour digits of a run that ends in front of `:dd`. Unlike [`split_before_clock`] a
/// short run may be all hour (`"10"` → `("", "10")`).
fn clock_hour_split(run: &[char]) -> (&[char], &[char]) {
    if run.len() <= 2 && digits_value(run).is_some_and(|h| h <= 23) {
        return run.split_at(0);
    }
    split_before_clock(run)
}

/// Leading day number: the leading digit run, minus any hour digits it runs into.
/// Returns the day and the char index right after it.
pub fn leading_day(chars: &[char]) -> Option<(u32, usize)> {
    let n = digit_run(chars, 0);
    if n == 0 {
        return None;
    }
    let run = &chars[..n];
    let day_digits = if clock_tail(chars, n).is_some() {
        split_before_clock(run).0
    } else {
        run
    };
    if day_digits.is_empty() {
        return None;
    }
    let day = digits_value(day_digits)?;
    (1..=31).contains(&day).then_some((day, day_digits.len()))
}

/// Seat marker at `i`, returning its char length.
fn seat_marker_at(chars: &[char], i: usize) -> Option<usize> {
    SEAT_MARKERS.iter().find_map(|m| {
        let mc: Vec<char> = m.chars().collect();
        chars
            .get(i..i + mc.len())
            .is_some_and(|w| w == mc.as_slice())
            .then_some(mc.len())
    })
}

fn skip_spaces(chars: &[char], mut i: usize) -> usize {
    while chars.get(i) == Some(&' ') {
        i += 1;
    }
    i
}

/// Tokenize `chars[from..]`. Characters that belong to no token class are skipped.
pub fn tokenize(chars: &[char], from: usize) -> Vec<Spanned> {
    let mut out = Vec::new();
    let mut i = from;

    while i < chars.len() {
        let c = chars[i];

        if let Some(sym) = Symbol::from_char(c) {
            out.push(Spanned {
                token: Token::Symbol(sym),
                start: i,
                end: i + 1,
            });
            i += 1;
            continue;
        }

        if let Some(mlen) = seat_marker_at(chars, i) {
            let start = i;
            let j = skip_spaces(chars, i + mlen);
            let n = digit_run(chars, j);
            if n == 0 {
                i += mlen;
                continue;
            }
            let run = &chars[j..j + n];
            let spaced = j > i + mlen;
            let run_is_hour = n <= 2 && digits_value(run).is_some_and(|h| h <= 23);
            if spaced && run_is_hour && clock_tail(chars, j + n).is_some() {
                // `残 13:00`: a separate clock, not a count glued to an hour.
                i = j;
                continue;
            }
            let seat_digits: &[char] = if clock_tail(chars, j + n).is_some() {
                // Digits adjacent to the clock: never let the seat count eat the hour.
                split_before_clock(run).0
            } else {
                &run[..n.min(2)]
            };
            if seat_digits.is_empty() {
                // The whole run is the hour; leave it for the clock branch.
                i = j;
                continue;
            }
            let mut end = j + seat_digits.len();
            if let Some(seats) = digits_value(seat_digits) {
                if chars.get(end) == Some(&SEAT_SUFFIX) {
                    end += 1;
                }
                out.push(Spanned {
                    token: Token::Seats(seats),
                    start,
                    end,
                });
            }
            i = end;
            continue;
        }

        if c.is_ascii_digit() {
            let n = digit_run(chars, i);
            if let Some(minute) = clock_tail(chars, i + n) {
                let (_, hour_digits) = clock_hour_split(&chars[i..i + n]);
                let hour_start = i + n - hour_digits.len();
                let clock = digits_value(hour_digits)
                    .filter(|h| *h <= 23)
                    .map(|h| ClockTime {
                        hour: h as u8,
                        minute,
                    });
                if let Some(clock) = clock {
                    out.push(Spanned {
                        token: Token::Clock(clock),
                        start: hour_start,
                        end: i + n + 3,
                    });
                }
                i += n + 3;
            } else {
                i += n;
            }
            continue;
        }

        i += 1;
    }

    out
}

/// Remaining-seat count that ends right before `pos` (ignoring spaces and a `席` suffix).
/// Never reaches further back than `floor`.
pub fn seats_ending_at(chars: &[char], floor: usize, pos: usize) -> Option<u32> {
    let mut end = pos;
    while end > floor && chars[end - 1] == ' ' {
        end -= 1;
    }
    if end > floor && chars[end - 1] == SEAT_SUFFIX {
        end -= 1;
        while end > floor && chars[end - 1] == ' ' {
            end -= 1;
        }
    }
    let mut start = end;
    while start > floor && chars[start - 1].is_ascii_digit() {
        start -= 1;
    }
    if start == end {
        return None;
    }
    let digits = &chars[start..end];

    let mut m_end = start;
    while m_end > floor && chars[m_end - 1] == ' ' {
        m_end -= 1;
    }
    let has_marker = SEAT_MARKERS.iter().any(|m| {
        let mc: Vec<char> = m.chars().collect();
        m_end >= floor + mc.len() && chars[m_end - mc.len()..m_end] == mc[..]
    });
    if has_marker {
        digits_value(digits)
    } else {
        None
    }
}

/// Nearest glyph within `window` chars before `pos`, stopping at another clock's `:`
/// or at `floor`.
pub fn symbol_before(chars: &[char], floor: usize, pos: usize, window: usize) -> Option<Symbol> {
    let lo = pos.saturating_sub(window).max(floor);
    chars[lo..pos]
        .iter()
        .rev()
        .take_while(|c| **c != ':')
        .find_map(|c| Symbol::from_char(*c))
}
