// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod calendar;
pub mod classify;
pub mod compose;
pub mod config;
pub mod extract;
pub mod fact;
pub mod ledger;
pub mod normalize;
pub mod pipeline;

// Page source + transports (external collaborators)
pub mod ingest;
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::config::WatchConfig;
pub use crate::fact::AvailabilityFact;
pub use crate::notify::{Notifier, NotifierMux};
pub use crate::pipeline::{run_once, RunReport};
