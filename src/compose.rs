// src/compose.rs
//! Notification composer: one message per run, facts in chronological order.

use crate::fact::AvailabilityFact;

/// Fixed header/footer around the fact lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pub title: String,
    /// Booking URL shown in the footer; omitted when empty.
    pub booking_url: String,
}

impl MessageTemplate {
    pub fn new(title: impl Into<String>, booking_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            booking_url: booking_url.into(),
        }
    }
}

/// `None` for an empty fact list; nothing is ever sent for an idle run.
pub fn compose(facts: &[AvailabilityFact], template: &MessageTemplate) -> Option<String> {
    if facts.is_empty() {
        return None;
    }

    let mut sorted: Vec<&AvailabilityFact> = facts.iter().collect();
    sorted.sort_by_key(|f| f.sort_key());
    let lines: Vec<String> = sorted.iter().map(|f| f.display()).collect();

    let mut msg = format!("{}\n\n{}", template.title, lines.join("\n"));
    if !template.booking_url.is_empty() {
        msg.push_str(&format!("\n\n予約: {}", template.booking_url));
    }
    Some(msg)
}
