// src/normalize.rs
//! Cell text canonicalization.
//!
//! Calendar cells mix full-width and half-width glyphs (`２７`, `１０：４５`, ideographic
//! spaces). Everything downstream matches against the output of [`normalize_text`], so
//! the fold has to be idempotent.

use once_cell::sync::OnceCell;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Normalize text: decode entities, NFKC fold, collapse whitespace, trim.
///
/// NFKC maps full-width digits and punctuation onto ASCII and leaves the availability
/// glyphs (`○`, `◎`, `△`, `×`) and kana untouched.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let decoded = html_escape::decode_html_entities(s);

    // 2) Compatibility fold (width/script)
    let folded: String = decoded.nfkc().collect();

    // 3) Collapse whitespace (NBSP and U+3000 are already spaces after NFKC)
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    re_ws.replace_all(&folded, " ").trim().to_string()
}

/// Normalize a list of labels, dropping empties and duplicates while keeping first order.
pub fn normalize_labels<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for l in labels {
        let n = normalize_text(l.as_ref());
        if !n.is_empty() && !out.contains(&n) {
            out.push(n);
        }
    }
    out
}
